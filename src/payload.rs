//! Action payloads.
//!
//! Most payloads are plain JSON data, but a caller may also hand the store a
//! value that has no data representation at all: a callback, a host handle,
//! or (through the browser bridge) a class instance or a Promise.  Those are
//! carried as [`Opaque`] leaves so the serializability middleware can point
//! at them by path instead of failing the dispatch.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A non-plain value travelling inside a payload.
#[derive(Clone)]
pub struct Opaque {
    kind: String,
    value: Rc<dyn Any>,
}

impl Opaque {
    /// Wrap an arbitrary value; its Rust type name becomes the reported kind.
    pub fn new<T: Any>(value: T) -> Self {
        Self::with_kind(std::any::type_name::<T>(), value)
    }

    pub fn with_kind<T: Any>(kind: impl Into<String>, value: T) -> Self {
        Opaque {
            kind: kind.into(),
            value: Rc::new(value),
        }
    }

    /// Wrap a callback.  Retrieve it again with
    /// `downcast_ref::<Rc<dyn Fn()>>()`.
    pub fn callback(f: impl Fn() + 'static) -> Self {
        let f: Rc<dyn Fn()> = Rc::new(f);
        Self::with_kind("function", f)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.kind)
    }
}

#[derive(Clone, Debug, Default)]
pub enum Payload {
    #[default]
    None,
    Plain(Value),
    List(Vec<Payload>),
    Object(Vec<(String, Payload)>),
    Opaque(Opaque),
}

impl Payload {
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Payload)>) -> Self {
        Payload::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }

    /// Plain JSON view of the payload, or `None` when any leaf is opaque.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Payload::None => Some(Value::Null),
            Payload::Plain(v) => Some(v.clone()),
            Payload::List(items) => items
                .iter()
                .map(Payload::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Payload::Object(fields) => fields
                .iter()
                .map(|(k, v)| v.to_value().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            Payload::Opaque(_) => None,
        }
    }

    /// Data view used by reducers: opaque object fields are dropped (a
    /// reducer never reads them), an opaque root or list item is `None`.
    fn to_data(&self) -> Option<Value> {
        match self {
            Payload::List(items) => items
                .iter()
                .map(Payload::to_data)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Payload::Object(fields) => Some(Value::Object(
                fields
                    .iter()
                    .filter(|(_, v)| !matches!(v, Payload::Opaque(_)))
                    .map(|(k, v)| v.to_data().map(|v| (k.clone(), v)))
                    .collect::<Option<serde_json::Map<_, _>>>()?,
            )),
            other => other.to_value(),
        }
    }

    /// Deserialize the payload into `T`.  The error string is meant for
    /// `StoreError::InvalidPayload`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, String> {
        let value = self
            .to_data()
            .ok_or_else(|| "payload is not plain data".to_string())?;
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Every opaque leaf together with its dotted path below `root`
    /// (`payload.owner.callback`, `payload.items[2]`).
    pub fn opaque_leaves(&self, root: &str) -> Vec<(String, &Opaque)> {
        let mut found = Vec::new();
        self.collect_opaque(root.to_string(), &mut found);
        found
    }

    fn collect_opaque<'a>(&'a self, path: String, found: &mut Vec<(String, &'a Opaque)>) {
        match self {
            Payload::None | Payload::Plain(_) => {}
            Payload::Opaque(o) => found.push((path, o)),
            Payload::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.collect_opaque(format!("{}[{}]", path, i), found);
                }
            }
            Payload::Object(fields) => {
                for (key, value) in fields {
                    value.collect_opaque(format!("{}.{}", path, key), found);
                }
            }
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Plain(value)
    }
}

impl From<Opaque> for Payload {
    fn from(value: Opaque) -> Self {
        Payload::Opaque(value)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::None => serializer.serialize_unit(),
            Payload::Plain(v) => v.serialize(serializer),
            Payload::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Payload::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Payload::Opaque(o) => Err(S::Error::custom(format!(
                "cannot serialize non-plain `{}` value",
                o.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opaque_leaves_report_paths() {
        let payload = Payload::object([
            ("amount", Payload::Plain(json!(5))),
            ("onDone", Payload::Opaque(Opaque::callback(|| {}))),
            (
                "extras",
                Payload::List(vec![
                    Payload::Plain(json!("a")),
                    Payload::Opaque(Opaque::new(42u8)),
                ]),
            ),
        ]);

        let leaves: Vec<(String, String)> = payload
            .opaque_leaves("payload")
            .into_iter()
            .map(|(p, o)| (p, o.kind().to_string()))
            .collect();
        assert_eq!(
            leaves,
            vec![
                ("payload.onDone".to_string(), "function".to_string()),
                ("payload.extras[1]".to_string(), "u8".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_payload_decodes() {
        let payload = Payload::object([("id", Payload::Plain(json!(7)))]);
        assert_eq!(payload.to_value(), Some(json!({ "id": 7 })));

        #[derive(serde::Deserialize)]
        struct Id {
            id: u64,
        }
        let id: Id = payload.decode().unwrap();
        assert_eq!(id.id, 7);
    }

    #[test]
    fn test_decode_skips_opaque_fields() {
        let payload = Payload::object([
            ("id", Payload::Plain(json!(3))),
            ("onDone", Payload::Opaque(Opaque::callback(|| {}))),
        ]);
        assert_eq!(payload.decode::<Value>().unwrap(), json!({ "id": 3 }));
        assert!(Payload::Opaque(Opaque::new(1u8)).decode::<Value>().is_err());
    }

    #[test]
    fn test_opaque_payload_refuses_to_serialize() {
        let payload = Payload::List(vec![Payload::Opaque(Opaque::callback(|| {}))]);
        assert!(payload.to_value().is_none());
        let err = serde_json::to_value(&payload).unwrap_err();
        assert!(err.to_string().contains("function"));
        assert!(payload.decode::<Value>().is_err());
    }

    #[test]
    fn test_callback_round_trips_through_downcast() {
        use std::cell::Cell;
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let opaque = Opaque::callback(move || hits_clone.set(hits_clone.get() + 1));

        let f = opaque.downcast_ref::<Rc<dyn Fn()>>().unwrap();
        f();
        assert_eq!(hits.get(), 1);
    }
}

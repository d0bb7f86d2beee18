//! Browser bridge.
//!
//! Exposes the exchange store to JavaScript as `WasmStore` and routes `log`
//! records to the devtools console.  JS payloads are converted into
//! [`Payload`] trees here; anything that is not plain data (functions, class
//! instances, Promises, BigInts, NaN) becomes an opaque leaf so the
//! serializability check can report it.

use js_sys::{Array, Function, Object, Reflect};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use serde_json::{Number, Value};
use uuid::Uuid;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::action::Action;
use crate::error::StoreError;
use crate::exchange::{configure_exchange_store_with, exchange_options};
use crate::payload::{Opaque, Payload};
use crate::store::Store;

// Largest integer a JS number represents exactly (Number.MAX_SAFE_INTEGER).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ---------------------------------------------------------------------------
// Console logging
// ---------------------------------------------------------------------------

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install the console logger.  A second call (or another logger already
/// being installed) is a no-op.
pub fn init_console_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    // Better panic messages in the browser console
    console_error_panic_hook::set_once();
    init_console_logger(LevelFilter::Info);
}

// ---------------------------------------------------------------------------
// JS <-> Rust conversion
// ---------------------------------------------------------------------------

fn to_js_error(err: StoreError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // json_compatible: plain objects instead of ES Maps for JSON maps.
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn opaque(kind: &str, value: &JsValue) -> Payload {
    Payload::Opaque(Opaque::with_kind(kind, value.clone()))
}

fn number_payload(n: f64, value: &JsValue) -> Payload {
    if !n.is_finite() {
        return opaque("non-finite number", value);
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Payload::Plain(Value::from(n as i64));
    }
    match Number::from_f64(n) {
        Some(num) => Payload::Plain(Value::Number(num)),
        None => opaque("non-finite number", value),
    }
}

// Name of the constructor behind a non-plain object, e.g. "Promise" or "Map".
fn constructor_name(proto: &JsValue) -> String {
    Reflect::get(proto, &JsValue::from_str("constructor"))
        .ok()
        .and_then(|ctor| ctor.dyn_into::<Function>().ok())
        .map(|ctor| String::from(ctor.name()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "object".to_string())
}

/// Convert an arbitrary JS value into a payload tree.  An array or object
/// that contains itself becomes an opaque `"circular"` leaf at the point
/// where the cycle closes.
pub fn payload_from_js(value: &JsValue) -> Payload {
    convert(value, &mut Vec::new())
}

fn convert(value: &JsValue, ancestors: &mut Vec<JsValue>) -> Payload {
    if value.is_undefined() {
        return Payload::None;
    }
    if value.is_null() {
        return Payload::Plain(Value::Null);
    }
    if let Some(b) = value.as_bool() {
        return Payload::Plain(Value::Bool(b));
    }
    if let Some(s) = value.as_string() {
        return Payload::Plain(Value::String(s));
    }
    if let Some(n) = value.as_f64() {
        return number_payload(n, value);
    }
    if value.is_bigint() {
        return opaque("bigint", value);
    }
    if value.is_symbol() {
        return opaque("symbol", value);
    }
    if value.is_function() {
        return opaque("function", value);
    }
    if ancestors.iter().any(|a| Object::is(a, value)) {
        return opaque("circular", value);
    }

    if Array::is_array(value) {
        ancestors.push(value.clone());
        let items = Array::from(value).iter().map(|item| convert(&item, ancestors)).collect();
        ancestors.pop();
        return Payload::List(items);
    }

    let proto: JsValue = Object::get_prototype_of(value).into();
    let object_proto: JsValue = Object::get_prototype_of(&Object::new()).into();
    if !proto.is_null() && proto != object_proto {
        return opaque(&constructor_name(&proto), value);
    }

    ancestors.push(value.clone());
    let fields = Object::entries(value.unchecked_ref::<Object>())
        .iter()
        .filter_map(|entry| {
            let pair = Array::from(&entry);
            let key = pair.get(0).as_string()?;
            Some((key, convert(&pair.get(1), ancestors)))
        })
        .collect();
    ancestors.pop();
    Payload::Object(fields)
}

/// Read a `{ type, payload }` object into an [`Action`].
pub fn action_from_js(value: &JsValue) -> Result<Action, JsValue> {
    if !value.is_object() {
        return Err(js_sys::TypeError::new("action must be an object").into());
    }
    let action_type = Reflect::get(value, &JsValue::from_str("type"))?
        .as_string()
        .ok_or_else(|| JsValue::from(js_sys::TypeError::new("action.type must be a string")))?;
    let payload = Reflect::get(value, &JsValue::from_str("payload"))?;
    Ok(Action::new(action_type).with_payload(payload_from_js(&payload)))
}

// ---------------------------------------------------------------------------
// Exported store
// ---------------------------------------------------------------------------

#[wasm_bindgen]
pub struct WasmStore {
    store: Store,
}

#[wasm_bindgen]
impl WasmStore {
    /// `new WasmStore()` uses the exchange defaults (serializable check off).
    /// Pass `{ serializableCheck, logActions, preloadedState }` to override;
    /// keys left out keep the exchange defaults, so `{ logActions: true }`
    /// still runs without the check.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmStore, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            exchange_options()
        } else {
            let overrides: Value = serde_wasm_bindgen::from_value(options)?;
            exchange_options().overlay(overrides).map_err(to_js_error)?
        };
        let store = configure_exchange_store_with(options).map_err(to_js_error)?;
        Ok(WasmStore { store })
    }

    /// Returns the dispatch report `{ actionType, handledBy, warnings }`.
    pub fn dispatch(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action = action_from_js(&action)?;
        let report = self.store.dispatch(action).map_err(to_js_error)?;
        to_js(&report)
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let state = self.store.get_state().map_err(to_js_error)?;
        to_js(&state)
    }

    /// Returns the subscription id to pass to `unsubscribe`.
    pub fn subscribe(&self, callback: Function) -> String {
        let subscription = self.store.subscribe(move |_| {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::error!("store listener threw: {:?}", e);
            }
        });
        subscription.id().to_string()
    }

    pub fn unsubscribe(&self, id: &str) -> bool {
        Uuid::parse_str(id)
            .map(|id| self.store.unsubscribe(id))
            .unwrap_or(false)
    }
}

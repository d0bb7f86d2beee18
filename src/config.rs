//! Store configuration.
//!
//! Options are a closed struct rather than an open bag of toggles.  They
//! deserialize from the same camelCase shape a JavaScript caller would pass
//! (`{ serializableCheck: false }`) and are validated once when the store is
//! built.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Warn when dispatched payloads (or region states) are not plain data.
    pub serializable_check: SerializableCheck,
    /// Log every dispatched action at debug level.
    pub log_actions: bool,
    /// Initial state for some or all regions, keyed by region name.
    pub preloaded_state: Option<Value>,
}

impl StoreOptions {
    /// Apply a partial options object on top of `self`.  Keys missing from
    /// `overrides` keep the value they have here rather than the crate
    /// defaults.
    pub fn overlay(&self, overrides: Value) -> Result<StoreOptions, StoreError> {
        let Value::Object(overrides) = overrides else {
            return Err(StoreError::Configuration(
                "options must be an object".to_string(),
            ));
        };
        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(base)) => base,
            Ok(_) => serde_json::Map::new(),
            Err(err) => return Err(StoreError::Configuration(err.to_string())),
        };
        merged.extend(overrides);
        serde_json::from_value(Value::Object(merged))
            .map_err(|err| StoreError::Configuration(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let SerializableCheck::Enabled(opts) = &self.serializable_check {
            if opts.ignored_actions.iter().any(|a| a.trim().is_empty()) {
                return Err(StoreError::Configuration(
                    "serializableCheck.ignoredActions must not contain empty entries".to_string(),
                ));
            }
            if opts.ignored_paths.iter().any(|p| p.trim().is_empty()) {
                return Err(StoreError::Configuration(
                    "serializableCheck.ignoredPaths must not contain empty entries".to_string(),
                ));
            }
        }
        if let Some(preloaded) = &self.preloaded_state {
            if !preloaded.is_object() {
                return Err(StoreError::Configuration(
                    "preloadedState must be an object keyed by region name".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Whether the serializability middleware is installed, and how.
///
/// Accepts `true`, `false`, or an options object when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CheckRepr", into = "CheckRepr")]
pub enum SerializableCheck {
    Disabled,
    Enabled(SerializableCheckOptions),
}

impl Default for SerializableCheck {
    fn default() -> Self {
        SerializableCheck::Enabled(SerializableCheckOptions::default())
    }
}

impl SerializableCheck {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SerializableCheck::Enabled(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SerializableCheckOptions {
    /// Action types that are never inspected.
    pub ignored_actions: Vec<String>,
    /// Path prefixes (`payload.onDone`, `state.order`) that never warn.
    pub ignored_paths: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CheckRepr {
    Flag(bool),
    Options(SerializableCheckOptions),
}

impl From<CheckRepr> for SerializableCheck {
    fn from(repr: CheckRepr) -> Self {
        match repr {
            CheckRepr::Flag(true) => SerializableCheck::default(),
            CheckRepr::Flag(false) => SerializableCheck::Disabled,
            CheckRepr::Options(opts) => SerializableCheck::Enabled(opts),
        }
    }
}

impl From<SerializableCheck> for CheckRepr {
    fn from(check: SerializableCheck) -> Self {
        match check {
            SerializableCheck::Disabled => CheckRepr::Flag(false),
            SerializableCheck::Enabled(opts) => CheckRepr::Options(opts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_from_js_shape() {
        let opts: StoreOptions = serde_json::from_value(json!({ "serializableCheck": false })).unwrap();
        assert_eq!(opts.serializable_check, SerializableCheck::Disabled);
        assert!(!opts.log_actions);

        let opts: StoreOptions = serde_json::from_value(json!({ "serializableCheck": true })).unwrap();
        assert!(opts.serializable_check.is_enabled());

        let opts: StoreOptions = serde_json::from_value(json!({
            "serializableCheck": { "ignoredActions": ["order/load"], "ignoredPaths": ["payload.onDone"] },
            "logActions": true
        }))
        .unwrap();
        assert_eq!(
            opts.serializable_check,
            SerializableCheck::Enabled(SerializableCheckOptions {
                ignored_actions: vec!["order/load".into()],
                ignored_paths: vec!["payload.onDone".into()],
            })
        );
        assert!(opts.log_actions);
    }

    #[test]
    fn test_defaults_enable_the_check() {
        let opts: StoreOptions = serde_json::from_value(json!({})).unwrap();
        assert!(opts.serializable_check.is_enabled());
        assert_eq!(opts, StoreOptions::default());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let res: Result<StoreOptions, _> = serde_json::from_value(json!({ "immutableCheck": false }));
        assert!(res.is_err());
    }

    #[test]
    fn test_overlay_keeps_base_for_missing_keys() {
        let base = StoreOptions {
            serializable_check: SerializableCheck::Disabled,
            ..Default::default()
        };

        let opts = base.overlay(json!({ "logActions": true })).unwrap();
        assert_eq!(opts.serializable_check, SerializableCheck::Disabled);
        assert!(opts.log_actions);

        let opts = base.overlay(json!({ "serializableCheck": true })).unwrap();
        assert!(opts.serializable_check.is_enabled());

        assert_eq!(base.overlay(json!({})).unwrap(), base);
        assert!(matches!(
            base.overlay(json!({ "immutableCheck": false })),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(base.overlay(json!(true)), Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_validate() {
        let opts = StoreOptions {
            serializable_check: SerializableCheck::Enabled(SerializableCheckOptions {
                ignored_actions: vec![" ".into()],
                ignored_paths: vec![],
            }),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(StoreError::Configuration(_))));

        let opts = StoreOptions {
            preloaded_state: Some(json!([1, 2])),
            ..Default::default()
        };
        assert!(opts.validate().is_err());

        assert!(StoreOptions::default().validate().is_ok());
    }
}

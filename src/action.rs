// src/action.rs
//
// Update requests submitted to the store.
//
use serde::Serialize;
use serde_json::Value;

use crate::constants::ACTION_TYPE_SEPARATOR;
use crate::payload::{Opaque, Payload};

/// An update request: a type string such as `"balance/add"` plus a payload.
///
/// Serializing an action fails when the payload holds an opaque value, which
/// is exactly the property the serializability check reports on.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Payload::is_none")]
    pub payload: Payload,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Action {
            action_type: action_type.into(),
            payload: Payload::None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Shorthand for an action carrying a plain JSON payload.
    pub fn plain(action_type: impl Into<String>, payload: Value) -> Self {
        Action::new(action_type).with_payload(payload)
    }

    /// Shorthand for an action whose whole payload is a non-plain value.
    pub fn opaque(action_type: impl Into<String>, payload: Opaque) -> Self {
        Action::new(action_type).with_payload(payload)
    }

    /// The region prefix of the action type, if it follows `region/verb`.
    pub fn region(&self) -> Option<&str> {
        self.action_type
            .split_once(ACTION_TYPE_SEPARATOR)
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
    }

    /// The verb after the region prefix, or the whole type when there is none.
    pub fn verb(&self) -> &str {
        self.action_type
            .split_once(ACTION_TYPE_SEPARATOR)
            .map(|(_, verb)| verb)
            .unwrap_or(&self.action_type)
    }

    /// Decode the payload for a reducer, mapping failures onto
    /// `StoreError::InvalidPayload`.
    pub fn decode_payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::StoreError> {
        self.payload
            .decode()
            .map_err(|reason| crate::StoreError::invalid_payload(&self.action_type, reason))
    }
}

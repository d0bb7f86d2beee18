//! Error type shared by every store operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The region table or the options were rejected while building a store.
    #[error("invalid store configuration: {0}")]
    Configuration(String),

    /// No registered region reacted to the dispatched action.
    #[error("no region handles action `{action_type}`")]
    UnknownRegion { action_type: String },

    /// A region recognised the action but could not read its payload.
    #[error("invalid payload for `{action_type}`: {reason}")]
    InvalidPayload { action_type: String, reason: String },

    /// A region recognised the action and refused to apply it.
    #[error("`{action_type}` rejected: {reason}")]
    Rejected { action_type: String, reason: String },

    #[error("failed to snapshot region `{region}`")]
    Snapshot {
        region: String,
        #[source]
        source: serde_json::Error,
    },

    /// Preloaded state parsed but broke a rule its region enforces.
    #[error("preloaded state for region `{region}` is invalid: {reason}")]
    InvalidState { region: String, reason: String },

    #[error("failed to hydrate region `{region}` from preloaded state")]
    Preload {
        region: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn invalid_payload(action_type: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidPayload {
            action_type: action_type.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(action_type: &str, reason: impl Into<String>) -> Self {
        StoreError::Rejected {
            action_type: action_type.to_string(),
            reason: reason.into(),
        }
    }
}

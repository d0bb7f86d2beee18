//! Serializability check.
//!
//! Flags dispatched payload values that are not plain data and region states
//! that no longer serialize.  Findings are warnings: the dispatch goes ahead.

use std::fmt;

use serde::Serialize;

use super::Middleware;
use crate::action::Action;
use crate::config::SerializableCheckOptions;
use crate::constants::{PAYLOAD_PATH_ROOT, STATE_PATH_ROOT};
use crate::reducer::Regions;
use crate::store::DispatchReport;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializabilityWarning {
    pub action_type: String,
    /// Dotted location of the offending value (`payload.onDone`, `state.order`).
    pub path: String,
    /// What was found there: the opaque kind, or the serializer error.
    pub value_kind: String,
}

impl fmt::Display for SerializabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "non-serializable value ({}) at `{}` while dispatching `{}`",
            self.value_kind, self.path, self.action_type
        )
    }
}

pub struct SerializableCheckMiddleware {
    options: SerializableCheckOptions,
}

impl SerializableCheckMiddleware {
    pub fn new(options: SerializableCheckOptions) -> Self {
        SerializableCheckMiddleware { options }
    }

    fn ignores_action(&self, action: &Action) -> bool {
        self.options
            .ignored_actions
            .iter()
            .any(|a| *a == action.action_type)
    }

    fn ignores_path(&self, path: &str) -> bool {
        self.options
            .ignored_paths
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }
}

// `payload.items` covers `payload.items`, `payload.items.x` and
// `payload.items[0]` but not `payload.itemsCount`.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

impl Middleware for SerializableCheckMiddleware {
    fn name(&self) -> &'static str {
        "serializable-check"
    }

    fn before_reduce(&self, action: &Action, report: &mut DispatchReport) {
        if self.ignores_action(action) {
            return;
        }
        for (path, opaque) in action.payload.opaque_leaves(PAYLOAD_PATH_ROOT) {
            if self.ignores_path(&path) {
                continue;
            }
            report.warnings.push(SerializabilityWarning {
                action_type: action.action_type.clone(),
                path,
                value_kind: opaque.kind().to_string(),
            });
        }
    }

    fn after_reduce(&self, action: &Action, regions: &Regions, report: &mut DispatchReport) {
        if self.ignores_action(action) {
            return;
        }
        for name in &report.handled_by {
            let path = format!("{}.{}", STATE_PATH_ROOT, name);
            if self.ignores_path(&path) {
                continue;
            }
            let Some(region) = regions.get(name) else { continue };
            if let Err(err) = region.snapshot() {
                let value_kind = std::error::Error::source(&err)
                    .map(|source| source.to_string())
                    .unwrap_or_else(|| err.to_string());
                report.warnings.push(SerializabilityWarning {
                    action_type: action.action_type.clone(),
                    path,
                    value_kind,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Opaque, Payload};
    use serde_json::json;

    fn report_for(action: &Action) -> DispatchReport {
        DispatchReport::new(&action.action_type)
    }

    #[test]
    fn test_path_prefix_matching() {
        assert!(path_has_prefix("payload.items", "payload.items"));
        assert!(path_has_prefix("payload.items[0]", "payload.items"));
        assert!(path_has_prefix("payload.items.x", "payload"));
        assert!(!path_has_prefix("payload.itemsCount", "payload.items"));
        assert!(!path_has_prefix("state.order", "payload"));
    }

    #[test]
    fn test_flags_every_opaque_leaf() {
        let check = SerializableCheckMiddleware::new(SerializableCheckOptions::default());
        let action = Action::new("order/place").with_payload(Payload::object([
            ("id", Payload::Plain(json!(1))),
            ("onDone", Payload::Opaque(Opaque::callback(|| {}))),
        ]));

        let mut report = report_for(&action);
        check.before_reduce(&action, &mut report);
        assert_eq!(
            report.warnings,
            vec![SerializabilityWarning {
                action_type: "order/place".into(),
                path: "payload.onDone".into(),
                value_kind: "function".into(),
            }]
        );
    }

    #[test]
    fn test_plain_payload_is_quiet() {
        let check = SerializableCheckMiddleware::new(SerializableCheckOptions::default());
        let action = Action::plain("balance/add", json!(5));
        let mut report = report_for(&action);
        check.before_reduce(&action, &mut report);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_ignored_actions_and_paths() {
        let action = Action::opaque("balance/add", Opaque::callback(|| {}));

        let check = SerializableCheckMiddleware::new(SerializableCheckOptions {
            ignored_actions: vec!["balance/add".into()],
            ignored_paths: vec![],
        });
        let mut report = report_for(&action);
        check.before_reduce(&action, &mut report);
        assert!(report.warnings.is_empty());

        let check = SerializableCheckMiddleware::new(SerializableCheckOptions {
            ignored_actions: vec![],
            ignored_paths: vec!["payload".into()],
        });
        let mut report = report_for(&action);
        check.before_reduce(&action, &mut report);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_warning_display() {
        let warning = SerializabilityWarning {
            action_type: "balance/add".into(),
            path: "payload".into(),
            value_kind: "function".into(),
        };
        assert_eq!(
            warning.to_string(),
            "non-serializable value (function) at `payload` while dispatching `balance/add`"
        );
    }
}

//! Cross-cutting interceptors that run around every dispatch.
//!
//! Middleware sees each action before the regions reduce it and again after
//! the new states are committed.  It cannot veto a dispatch; anything it
//! finds is recorded on the [`DispatchReport`].

pub mod action_log;
pub mod serializable;

use crate::action::Action;
use crate::config::{SerializableCheck, StoreOptions};
use crate::reducer::Regions;
use crate::store::DispatchReport;

pub use action_log::ActionLogMiddleware;
pub use serializable::{SerializabilityWarning, SerializableCheckMiddleware};

pub trait Middleware {
    fn name(&self) -> &'static str;

    fn before_reduce(&self, _action: &Action, _report: &mut DispatchReport) {}

    fn after_reduce(&self, _action: &Action, _regions: &Regions, _report: &mut DispatchReport) {}
}

/// The middleware list implied by `options`, in execution order.
pub fn default_middleware(options: &StoreOptions) -> Vec<Box<dyn Middleware>> {
    let mut list: Vec<Box<dyn Middleware>> = Vec::new();
    if let SerializableCheck::Enabled(check) = &options.serializable_check {
        list.push(Box::new(SerializableCheckMiddleware::new(check.clone())));
    }
    if options.log_actions {
        list.push(Box::new(ActionLogMiddleware));
    }
    list
}

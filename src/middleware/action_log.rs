use log::debug;

use super::Middleware;
use crate::action::Action;
use crate::reducer::Regions;
use crate::store::DispatchReport;

/// Debug-level trace of every dispatched action.
pub struct ActionLogMiddleware;

impl Middleware for ActionLogMiddleware {
    fn name(&self) -> &'static str {
        "action-log"
    }

    fn before_reduce(&self, action: &Action, _report: &mut DispatchReport) {
        debug!("dispatch `{}`", action.action_type);
    }

    fn after_reduce(&self, action: &Action, _regions: &Regions, report: &mut DispatchReport) {
        debug!(
            "`{}` handled by [{}]",
            action.action_type,
            report.handled_by.join(", ")
        );
    }
}

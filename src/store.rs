// src/store.rs
//
// The application-wide state container.  A `Store` is built once, passed by
// reference to whoever needs it, and mutated only through `dispatch`.
//
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::action::Action;
use crate::config::StoreOptions;
use crate::error::StoreError;
use crate::middleware::{default_middleware, Middleware, SerializabilityWarning};
use crate::reducer::{Region, Regions};
use crate::state::RootState;

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub action_type: String,
    /// Regions whose reducer handled the action, in registration order.
    pub handled_by: Vec<String>,
    pub warnings: Vec<SerializabilityWarning>,
}

impl DispatchReport {
    pub(crate) fn new(action_type: &str) -> Self {
        DispatchReport {
            action_type: action_type.to_string(),
            handled_by: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

type Listener = Rc<dyn Fn(&Store)>;

#[derive(Default)]
struct Listeners {
    entries: Vec<(Uuid, Listener)>,
}

impl Listeners {
    fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }
}

/// Handle returned by [`Store::subscribe`].  Dropping it keeps the listener
/// registered; call [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    registry: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns false when the listener was already gone (or the store was
    /// dropped).
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.borrow_mut().remove(self.id),
            None => false,
        }
    }
}

pub struct Store {
    regions: Regions,
    middleware: Vec<Box<dyn Middleware>>,
    listeners: Rc<RefCell<Listeners>>,
}

/// Build a store from a set of named regions.
///
/// Fails with `StoreError::Configuration` when two regions share a name, a
/// name is empty or contains `/`, no regions are given, or the options do
/// not validate.
pub fn configure_store(
    regions: impl IntoIterator<Item = Region>,
    options: StoreOptions,
) -> Result<Store, StoreError> {
    Store::assemble(regions.into_iter().collect(), options, Vec::new())
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    fn assemble(
        regions: Vec<Region>,
        options: StoreOptions,
        extra_middleware: Vec<Box<dyn Middleware>>,
    ) -> Result<Store, StoreError> {
        options.validate()?;
        let mut regions = Regions::new(regions)?;
        if let Some(preloaded) = options.preloaded_state.clone() {
            regions.hydrate(preloaded)?;
        }

        let mut middleware = default_middleware(&options);
        middleware.extend(extra_middleware);

        info!(
            "store configured: regions [{}], middleware [{}]",
            regions.names().collect::<Vec<_>>().join(", "),
            middleware.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Store {
            regions,
            middleware,
            listeners: Rc::new(RefCell::new(Listeners::default())),
        })
    }

    /// Snapshot of the global state, keyed by region name.
    pub fn get_state(&self) -> Result<RootState, StoreError> {
        self.regions.snapshot()
    }

    /// Typed read of one region's state.
    pub fn select<S: 'static>(&self, region: &str) -> Option<&S> {
        self.regions.get(region).and_then(Region::select::<S>)
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Apply `action` to every region, then notify listeners.
    ///
    /// Nothing is committed and no listener runs when a reducer fails or when
    /// no region handles the action (`StoreError::UnknownRegion`).
    /// Serializability findings never fail the dispatch; they are logged and
    /// returned on the report.
    pub fn dispatch(&mut self, action: Action) -> Result<DispatchReport, StoreError> {
        let mut report = DispatchReport::new(&action.action_type);

        for m in &self.middleware {
            m.before_reduce(&action, &mut report);
        }
        log_warnings(&report.warnings);
        let logged = report.warnings.len();

        let handled_by = self.regions.apply(&action)?;
        if handled_by.is_empty() {
            debug!("`{}` ignored by every region", action.action_type);
            return Err(StoreError::UnknownRegion {
                action_type: action.action_type,
            });
        }
        report.handled_by = handled_by;

        for m in &self.middleware {
            m.after_reduce(&action, &self.regions, &mut report);
        }
        log_warnings(&report.warnings[logged..]);

        self.notify();
        Ok(report)
    }

    /// Register a listener called synchronously after every successful
    /// dispatch.
    pub fn subscribe(&self, listener: impl Fn(&Store) + 'static) -> Subscription {
        let id = Uuid::new_v4();
        let listener: Listener = Rc::new(listener);
        self.listeners.borrow_mut().entries.push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(&self.listeners),
        }
    }

    /// Remove a listener by id.  Same effect as `Subscription::unsubscribe`.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    fn notify(&self) {
        // Snapshot first: listeners may subscribe or unsubscribe while running.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(self);
        }
    }
}

fn log_warnings(warnings: &[SerializabilityWarning]) {
    for warning in warnings {
        warn!("{}", warning);
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("regions", &self.regions.names().collect::<Vec<_>>())
            .field("middleware", &self.middleware_names())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Fluent construction: `Store::builder().region(..).options(..).build()`.
#[derive(Default)]
pub struct StoreBuilder {
    regions: Vec<Region>,
    options: StoreOptions,
    middleware: Vec<Box<dyn Middleware>>,
}

impl StoreBuilder {
    pub fn region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a middleware after the defaults implied by the options.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn build(self) -> Result<Store, StoreError> {
        Store::assemble(self.regions, self.options, self.middleware)
    }
}

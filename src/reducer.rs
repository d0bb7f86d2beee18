//! Reducers and the type-erased region table the store is built from.
//!
//! A [`Reducer`] owns the shape and update logic of one region.  The store
//! keeps heterogeneous reducers side by side by erasing their state type
//! behind [`Region`]; typed access comes back through `select`.

use std::any::Any;
use std::collections::HashSet;

use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::action::Action;
use crate::constants::ACTION_TYPE_SEPARATOR;
use crate::error::StoreError;
use crate::state::RootState;

pub trait Reducer: 'static {
    type State: Clone + Serialize + DeserializeOwned + 'static;

    fn initial_state(&self) -> Self::State;

    /// Apply `action` to `state`.  Returns `Ok(false)` when the action is
    /// not meant for this reducer; the state must then be left untouched.
    fn reduce(&self, state: &mut Self::State, action: &Action) -> Result<bool, StoreError>;

    /// Check a state that did not come out of `reduce` (preloaded state).
    /// The error string names the broken rule.
    fn validate(&self, _state: &Self::State) -> Result<(), String> {
        Ok(())
    }
}

/// A reducer backed by a pure function `(state, action) -> Option<next>`.
/// `None` means the action was ignored.
pub struct FnReducer<S, F> {
    initial: S,
    f: F,
}

pub fn from_fn<S, F>(initial: S, f: F) -> FnReducer<S, F>
where
    F: Fn(&S, &Action) -> Option<S>,
{
    FnReducer { initial, f }
}

impl<S, F> Reducer for FnReducer<S, F>
where
    S: Clone + Serialize + DeserializeOwned + 'static,
    F: Fn(&S, &Action) -> Option<S> + 'static,
{
    type State = S;

    fn initial_state(&self) -> S {
        self.initial.clone()
    }

    fn reduce(&self, state: &mut S, action: &Action) -> Result<bool, StoreError> {
        match (self.f)(state, action) {
            Some(next) => {
                *state = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Type erasure
// ---------------------------------------------------------------------------

trait ErasedSlot {
    /// Compute the next state without touching the current one.
    fn stage(&self, action: &Action) -> Result<Option<Box<dyn Any>>, StoreError>;
    fn commit(&mut self, staged: Box<dyn Any>);
    fn snapshot(&self) -> Result<Value, serde_json::Error>;
    fn hydrate(&mut self, region: &str, value: Value) -> Result<(), StoreError>;
    fn state_any(&self) -> &dyn Any;
}

struct Slot<R: Reducer> {
    reducer: R,
    state: R::State,
}

impl<R: Reducer> ErasedSlot for Slot<R> {
    fn stage(&self, action: &Action) -> Result<Option<Box<dyn Any>>, StoreError> {
        let mut next = self.state.clone();
        if self.reducer.reduce(&mut next, action)? {
            Ok(Some(Box::new(next)))
        } else {
            Ok(None)
        }
    }

    fn commit(&mut self, staged: Box<dyn Any>) {
        match staged.downcast::<R::State>() {
            Ok(next) => self.state = *next,
            Err(_) => error!(
                "staged state is not a `{}`; commit skipped",
                std::any::type_name::<R::State>()
            ),
        }
    }

    fn snapshot(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.state)
    }

    fn hydrate(&mut self, region: &str, value: Value) -> Result<(), StoreError> {
        let state: R::State = serde_json::from_value(value).map_err(|source| StoreError::Preload {
            region: region.to_string(),
            source,
        })?;
        self.reducer
            .validate(&state)
            .map_err(|reason| StoreError::InvalidState {
                region: region.to_string(),
                reason,
            })?;
        self.state = state;
        Ok(())
    }

    fn state_any(&self) -> &dyn Any {
        &self.state
    }
}

/// A named region: one reducer plus its current state.
pub struct Region {
    name: String,
    slot: Box<dyn ErasedSlot>,
}

/// Pair a region name with its reducer.  The reducer's initial state becomes
/// the region's state.
pub fn region<R: Reducer>(name: impl Into<String>, reducer: R) -> Region {
    let state = reducer.initial_state();
    Region {
        name: name.into(),
        slot: Box::new(Slot { reducer, state }),
    }
}

impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed view of the region state.  `None` when `S` is not the state
    /// type of this region's reducer.
    pub fn select<S: 'static>(&self) -> Option<&S> {
        self.slot.state_any().downcast_ref::<S>()
    }

    pub fn snapshot(&self) -> Result<Value, StoreError> {
        self.slot.snapshot().map_err(|source| StoreError::Snapshot {
            region: self.name.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region").field("name", &self.name).finish()
    }
}

/// The validated, ordered set of regions held by a store.
#[derive(Debug)]
pub struct Regions {
    entries: Vec<Region>,
}

impl Regions {
    pub(crate) fn new(entries: Vec<Region>) -> Result<Self, StoreError> {
        if entries.is_empty() {
            return Err(StoreError::Configuration(
                "a store needs at least one region".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.is_empty() {
                return Err(StoreError::Configuration(
                    "region names must not be empty".to_string(),
                ));
            }
            if entry.name.contains(ACTION_TYPE_SEPARATOR) {
                return Err(StoreError::Configuration(format!(
                    "region name `{}` must not contain `{}`",
                    entry.name, ACTION_TYPE_SEPARATOR
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(StoreError::Configuration(format!(
                    "duplicate region name `{}`",
                    entry.name
                )));
            }
        }

        Ok(Regions { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.entries.iter().find(|r| r.name == name)
    }

    /// Run `action` through every region.  All next states are staged
    /// first; nothing is committed if any reducer fails.  Returns the names
    /// of the regions that handled the action.
    pub(crate) fn apply(&mut self, action: &Action) -> Result<Vec<String>, StoreError> {
        let mut staged = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Some(next) = entry.slot.stage(action)? {
                staged.push((idx, next));
            }
        }

        let mut handled_by = Vec::with_capacity(staged.len());
        for (idx, next) in staged {
            let entry = &mut self.entries[idx];
            entry.slot.commit(next);
            handled_by.push(entry.name.clone());
        }
        Ok(handled_by)
    }

    /// Replace region states with the matching keys of a preloaded object.
    /// Every key must name a registered region.
    pub(crate) fn hydrate(&mut self, preloaded: Value) -> Result<(), StoreError> {
        let Value::Object(map) = preloaded else {
            return Err(StoreError::Configuration(
                "preloaded state must be an object keyed by region name".to_string(),
            ));
        };

        if let Some(unknown) = map.keys().find(|k| self.get(k).is_none()) {
            return Err(StoreError::Configuration(format!(
                "preloaded state names unknown region `{}`",
                unknown
            )));
        }

        for (name, value) in map {
            if let Some(entry) = self.entries.iter_mut().find(|r| r.name == name) {
                entry.slot.hydrate(&name, value)?;
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<RootState, StoreError> {
        let mut root = serde_json::Map::new();
        for entry in &self.entries {
            root.insert(entry.name.clone(), entry.snapshot()?);
        }
        Ok(RootState::from(root))
    }
}

//! Application state container for the exchange front end.
//!
//! Independently written reducers each own one named region of the global
//! state.  [`configure_store`] aggregates them into a [`Store`] that can be
//! read, dispatched to, and subscribed to; [`configure_exchange_store`] is
//! the exchange's own wiring of the `balance` and `order` regions.
//!
//! ```rust
//! use exchange_store::{configure_exchange_store, reducers::balance};
//! use serde_json::json;
//!
//! let mut store = configure_exchange_store().unwrap();
//! store.dispatch(balance::add(5)).unwrap();
//! assert_eq!(
//!     store.get_state().unwrap().into_value(),
//!     json!({ "balance": { "value": 5 }, "order": { "items": [] } })
//! );
//! ```

pub mod action;
pub mod config;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod middleware;
pub mod payload;
pub mod reducer;
pub mod reducers;
pub mod state;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{SerializableCheck, SerializableCheckOptions, StoreOptions};
pub use error::StoreError;
pub use exchange::{configure_exchange_store, configure_exchange_store_with};
pub use middleware::{Middleware, SerializabilityWarning};
pub use payload::{Opaque, Payload};
pub use reducer::{from_fn, region, Reducer, Region};
pub use state::RootState;
pub use store::{configure_store, DispatchReport, Store, StoreBuilder, Subscription};

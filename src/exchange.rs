//! The exchange front end's store: `balance` and `order` regions, with the
//! serializability check switched off.

use crate::config::{SerializableCheck, StoreOptions};
use crate::constants::{BALANCE_REGION, ORDER_REGION};
use crate::error::StoreError;
use crate::reducer::region;
use crate::reducers::{BalanceReducer, OrderReducer};
use crate::store::{configure_store, Store};

/// Options the exchange store is built with: the crate defaults with the
/// serializability check disabled.
pub fn exchange_options() -> StoreOptions {
    StoreOptions {
        serializable_check: SerializableCheck::Disabled,
        ..Default::default()
    }
}

/// Build the exchange store with [`exchange_options`].
///
/// ```
/// use exchange_store::{configure_exchange_store, reducers::balance};
///
/// let mut store = configure_exchange_store().unwrap();
/// store.dispatch(balance::add(5)).unwrap();
/// assert_eq!(
///     store.get_state().unwrap().region("balance"),
///     Some(&serde_json::json!({ "value": 5 }))
/// );
/// ```
pub fn configure_exchange_store() -> Result<Store, StoreError> {
    configure_exchange_store_with(exchange_options())
}

/// Build the `balance` and `order` regions with caller-supplied options.
/// Start from [`exchange_options`] to keep the check disabled.
pub fn configure_exchange_store_with(options: StoreOptions) -> Result<Store, StoreError> {
    configure_store(
        [
            region(BALANCE_REGION, BalanceReducer),
            region(ORDER_REGION, OrderReducer),
        ],
        options,
    )
}

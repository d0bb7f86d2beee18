//! The exchange's regions.  Each one owns its slice of the root state and
//! the action creators that target it.

pub mod balance;
pub mod order;

pub use balance::{BalanceReducer, BalanceState};
pub use order::{Order, OrderReducer, OrderState, OrderStatus};

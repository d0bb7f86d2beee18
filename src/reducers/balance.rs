//! Balance region: the user's available balance in base units.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::action::Action;
use crate::error::StoreError;
use crate::reducer::Reducer;

pub const ADD: &str = "balance/add";
pub const SUBTRACT: &str = "balance/subtract";
pub const SET: &str = "balance/set";
pub const RESET: &str = "balance/reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceState {
    pub value: i64,
}

pub struct BalanceReducer;

pub fn add(amount: i64) -> Action {
    Action::plain(ADD, json!(amount))
}

pub fn subtract(amount: i64) -> Action {
    Action::plain(SUBTRACT, json!(amount))
}

pub fn set(value: i64) -> Action {
    Action::plain(SET, json!(value))
}

pub fn reset() -> Action {
    Action::new(RESET)
}

fn amount(action: &Action) -> Result<i64, StoreError> {
    let amount: i64 = action.decode_payload()?;
    if amount < 0 {
        return Err(StoreError::invalid_payload(
            &action.action_type,
            format!("amount must not be negative, got {}", amount),
        ));
    }
    Ok(amount)
}

impl Reducer for BalanceReducer {
    type State = BalanceState;

    fn initial_state(&self) -> BalanceState {
        BalanceState::default()
    }

    fn reduce(&self, state: &mut BalanceState, action: &Action) -> Result<bool, StoreError> {
        match action.action_type.as_str() {
            ADD => {
                let amount = amount(action)?;
                state.value = state
                    .value
                    .checked_add(amount)
                    .ok_or_else(|| StoreError::rejected(ADD, "balance would overflow"))?;
                Ok(true)
            }
            SUBTRACT => {
                let amount = amount(action)?;
                if amount > state.value {
                    return Err(StoreError::rejected(
                        SUBTRACT,
                        format!("insufficient balance: have {}, need {}", state.value, amount),
                    ));
                }
                state.value -= amount;
                Ok(true)
            }
            SET => {
                state.value = amount(action)?;
                Ok(true)
            }
            RESET => {
                *state = BalanceState::default();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn validate(&self, state: &BalanceState) -> Result<(), String> {
        if state.value < 0 {
            return Err(format!("balance must not be negative, got {}", state.value));
        }
        Ok(())
    }
}

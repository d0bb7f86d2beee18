//! Order region: the exchange order book as seen by the front end.
//!
//! Orders are never removed.  Cancelling or filling an order moves it out of
//! `Open`; the selectors split the list the way the order tables show it.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::action::Action;
use crate::error::StoreError;
use crate::reducer::Reducer;

pub const PLACE: &str = "order/place";
pub const CANCEL: &str = "order/cancel";
pub const FILL: &str = "order/fill";
pub const LOAD: &str = "order/load";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Open,
    Filled,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Open => "open",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub user: String,
    pub token_get: String,
    pub amount_get: u64,
    pub token_give: String,
    pub amount_give: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        id: u64,
        user: impl Into<String>,
        (token_get, amount_get): (impl Into<String>, u64),
        (token_give, amount_give): (impl Into<String>, u64),
    ) -> Self {
        Order {
            id,
            user: user.into(),
            token_get: token_get.into(),
            amount_get,
            token_give: token_give.into(),
            amount_give,
            timestamp: Utc::now(),
            status: OrderStatus::Open,
        }
    }

    pub fn placed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderState {
    pub items: Vec<Order>,
}

#[derive(Deserialize)]
struct OrderRef {
    id: u64,
}

pub struct OrderReducer;

pub fn place(order: Order) -> Action {
    Action::plain(PLACE, json!(order))
}

pub fn cancel(id: u64) -> Action {
    Action::plain(CANCEL, json!({ "id": id }))
}

pub fn fill(id: u64) -> Action {
    Action::plain(FILL, json!({ "id": id }))
}

/// Replace the whole list, e.g. after reading past orders from the chain.
pub fn load(orders: Vec<Order>) -> Action {
    Action::plain(LOAD, json!(orders))
}

pub fn find(state: &OrderState, id: u64) -> Option<&Order> {
    state.items.iter().find(|o| o.id == id)
}

pub fn open_orders(state: &OrderState) -> impl Iterator<Item = &Order> {
    by_status(state, OrderStatus::Open)
}

pub fn filled_orders(state: &OrderState) -> impl Iterator<Item = &Order> {
    by_status(state, OrderStatus::Filled)
}

pub fn cancelled_orders(state: &OrderState) -> impl Iterator<Item = &Order> {
    by_status(state, OrderStatus::Cancelled)
}

fn by_status(state: &OrderState, status: OrderStatus) -> impl Iterator<Item = &Order> {
    state.items.iter().filter(move |o| o.status == status)
}

fn duplicate_id(orders: &[Order]) -> Option<u64> {
    let mut ids = HashSet::new();
    orders.iter().find(|o| !ids.insert(o.id)).map(|o| o.id)
}

fn close(state: &mut OrderState, action: &Action, to: OrderStatus) -> Result<(), StoreError> {
    let OrderRef { id } = action.decode_payload()?;
    let order = state
        .items
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| StoreError::rejected(&action.action_type, format!("unknown order {}", id)))?;
    if !order.is_open() {
        return Err(StoreError::rejected(
            &action.action_type,
            format!("order {} is already {}", id, order.status),
        ));
    }
    order.status = to;
    Ok(())
}

impl Reducer for OrderReducer {
    type State = OrderState;

    fn initial_state(&self) -> OrderState {
        OrderState::default()
    }

    fn reduce(&self, state: &mut OrderState, action: &Action) -> Result<bool, StoreError> {
        match action.action_type.as_str() {
            PLACE => {
                let order: Order = action.decode_payload()?;
                if find(state, order.id).is_some() {
                    return Err(StoreError::rejected(
                        PLACE,
                        format!("order {} already exists", order.id),
                    ));
                }
                if !order.is_open() {
                    return Err(StoreError::rejected(PLACE, "new orders must be open"));
                }
                state.items.push(order);
                Ok(true)
            }
            CANCEL => close(state, action, OrderStatus::Cancelled).map(|_| true),
            FILL => close(state, action, OrderStatus::Filled).map(|_| true),
            LOAD => {
                let orders: Vec<Order> = action.decode_payload()?;
                if let Some(dup) = duplicate_id(&orders) {
                    return Err(StoreError::invalid_payload(
                        LOAD,
                        format!("duplicate order id {}", dup),
                    ));
                }
                state.items = orders;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn validate(&self, state: &OrderState) -> Result<(), String> {
        match duplicate_id(&state.items) {
            Some(dup) => Err(format!("duplicate order id {}", dup)),
            None => Ok(()),
        }
    }
}

// Region names used by the exchange store - single source of truth for keys in
// the root state object.
pub const BALANCE_REGION: &str = "balance";
pub const ORDER_REGION: &str = "order";

// Separates the owning region from the verb in an action type ("balance/add").
pub const ACTION_TYPE_SEPARATOR: char = '/';

// Path prefixes used in serializability warnings.
pub const PAYLOAD_PATH_ROOT: &str = "payload";
pub const STATE_PATH_ROOT: &str = "state";

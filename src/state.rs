use serde::Serialize;
use serde_json::{Map, Value};

/// Snapshot of the global state: the keyed union of every region's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RootState(Map<String, Value>);

impl RootState {
    pub fn region(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RootState {
    fn from(map: Map<String, Value>) -> Self {
        RootState(map)
    }
}

impl PartialEq<Value> for RootState {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(map) if *map == self.0)
    }
}

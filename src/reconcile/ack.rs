//! Acknowledgement list for reported properties.

use serde_json::{Map, Value};

/// Echoed value of an accepted property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckValue {
    Bool(bool),
    Num(u32),
    /// The property was `null` and its default was restored.
    Null,
}

impl AckValue {
    pub fn from_bool(v: Option<bool>) -> Self {
        v.map_or(Self::Null, Self::Bool)
    }

    pub fn from_num(v: Option<u32>) -> Self {
        v.map_or(Self::Null, Self::Num)
    }
}

impl From<AckValue> for Value {
    fn from(v: AckValue) -> Self {
        match v {
            AckValue::Bool(b) => Value::Bool(b),
            AckValue::Num(n) => Value::from(n),
            AckValue::Null => Value::Null,
        }
    }
}

/// One property this module validated and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAck {
    pub name: String,
    pub value: AckValue,
}

impl PropertyAck {
    pub fn new(name: &str, value: AckValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Reported-properties object for a list of acks.
pub fn reported(acks: &[PropertyAck]) -> Map<String, Value> {
    acks.iter()
        .map(|ack| (ack.name.clone(), Value::from(ack.value)))
        .collect()
}

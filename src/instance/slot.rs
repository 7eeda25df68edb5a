//! Stored field contents

use super::array::ManagedArray;
use super::engine::Instance;
use crate::value::Value;

/// What an instance stores for one field.
///
/// Scalars and plain objects are held as [`Value`]s; schema objects and
/// arrays are live containers owned by the slot for the instance lifetime.
#[derive(Debug)]
pub enum Slot {
    Value(Value),
    Object(Instance),
    Array(ManagedArray),
}

impl Slot {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Slot::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ManagedArray> {
        match self {
            Slot::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Plain deep copy: containers are unwrapped through `to_object` /
    /// `to_array`.
    pub fn to_value(&self) -> Value {
        self.to_plain(None)
    }

    pub(crate) fn to_plain(&self, root: Option<&Instance>) -> Value {
        match self {
            Slot::Value(value) => value.clone(),
            Slot::Object(instance) => Value::Object(instance.to_object_in(root)),
            Slot::Array(array) => Value::Array(array.to_array_in(root)),
        }
    }

    /// Strict equality: scalars by value, containers never.
    pub(crate) fn strict_eq(&self, other: &Slot) -> bool {
        match (self, other) {
            (Slot::Value(a), Slot::Value(b)) => a.strict_eq(b),
            _ => false,
        }
    }
}

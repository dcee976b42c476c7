//! Wire-ready values produced by field completion.
//!
//! Ported from `juniper::value`, trimmed to a single concrete scalar
//! representation (see [`scalar::ScalarValue`]) instead of a generic
//! `Value<S>`.

mod object;
mod scalar;

pub use self::{object::Object, scalar::ScalarValue};

use serde::{Serialize, Serializer};

/// Serializable value returned from query and field execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(ScalarValue),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn null() -> Self {
        Self::Null
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn object(o: Object) -> Self {
        Self::Object(o)
    }

    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    pub fn scalar(s: impl Into<ScalarValue>) -> Self {
        Self::Scalar(s.into())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Scalar(s) => s.serialize(serializer),
            Self::List(l) => l.serialize(serializer),
            Self::Object(o) => o.serialize(serializer),
        }
    }
}

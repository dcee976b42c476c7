use std::iter::FromIterator;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use super::Value;

/// An ordered field-name → value mapping.
///
/// Ported from `juniper::value::object::Object`: an `IndexMap` wrapper that
/// preserves response-key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    key_value_list: IndexMap<String, Value>,
}

impl Object {
    pub fn with_capacity(size: usize) -> Self {
        Self {
            key_value_list: IndexMap::with_capacity(size),
        }
    }

    /// Adds a field, returning the value it replaced, if any.
    pub fn add_field(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.key_value_list.insert(key.into(), value)
    }

    pub fn contains_field(&self, key: &str) -> bool {
        self.key_value_list.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.key_value_list.iter()
    }

    pub fn field_count(&self) -> usize {
        self.key_value_list.len()
    }

    pub fn get_field_value(&self, key: &str) -> Option<&Value> {
        self.key_value_list.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.key_value_list.keys()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            key_value_list: IndexMap::from_iter(iter),
        }
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.key_value_list.into_iter()
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.key_value_list.len()))?;
        for (k, v) in &self.key_value_list {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

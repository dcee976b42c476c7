//! Type and field metadata, ported from `juniper::schema::meta`.

use std::sync::Arc;

use crate::ast::Type;
use crate::resolve::{Resolver, ResolverReturn, RuntimeValue};
use crate::value::ScalarValue;

pub struct ArgumentDefinition {
    pub name: String,
    pub input_type: Type,
}

pub struct FieldDefinition {
    pub name: String,
    pub output_type: Type,
    pub arguments: Vec<ArgumentDefinition>,
    pub resolver: Option<Arc<Resolver>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, output_type: Type) -> Self {
        Self {
            name: name.into(),
            output_type,
            arguments: Vec::new(),
            resolver: None,
        }
    }

    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RuntimeValue, &crate::ast::Arguments, &crate::resolve::Context, &crate::resolve::ResolveInfo) -> ResolverReturn
            + Send
            + Sync
            + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, input_type: Type) -> Self {
        self.arguments.push(ArgumentDefinition {
            name: name.into(),
            input_type,
        });
        self
    }
}

/// Serializes a resolved leaf value to its wire representation, or signals
/// an invalid value.
pub type LeafSerializer = dyn Fn(&RuntimeValue) -> Option<ScalarValue> + Send + Sync;

pub struct ScalarTypeDef {
    pub name: String,
    pub serialize: Arc<LeafSerializer>,
}

pub struct EnumTypeDef {
    pub name: String,
    pub values: Vec<String>,
    pub serialize: Arc<LeafSerializer>,
}

/// Tests whether a resolved object's concrete type is a valid instance of
/// its declared type.
pub type IsTypeOf = dyn Fn(&RuntimeValue) -> ResolverReturn + Send + Sync;

pub struct ObjectTypeDef {
    pub name: String,
    pub fields: indexmap::IndexMap<String, FieldDefinition>,
    pub is_type_of: Option<Arc<IsTypeOf>>,
}

impl ObjectTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: indexmap::IndexMap::new(),
            is_type_of: None,
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn with_is_type_of<F>(mut self, is_type_of: F) -> Self
    where
        F: Fn(&RuntimeValue) -> ResolverReturn + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(is_type_of));
        self
    }
}

/// Resolves the concrete object type for an abstract value. Resolves to `RuntimeValue::String(name)`.
pub type ResolveType = dyn Fn(&RuntimeValue) -> ResolverReturn + Send + Sync;

pub struct AbstractTypeDef {
    pub name: String,
    pub possible_types: Vec<String>,
    pub resolve_type: Option<Arc<ResolveType>>,
}

impl AbstractTypeDef {
    pub fn new(name: impl Into<String>, possible_types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            possible_types,
            resolve_type: None,
        }
    }

    pub fn with_resolve_type<F>(mut self, resolve_type: F) -> Self
    where
        F: Fn(&RuntimeValue) -> ResolverReturn + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }
}

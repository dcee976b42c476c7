//! The schema data model: types, fields, and the resolvers attached to
//! them. Ported from `juniper::schema`, but hand-buildable rather than
//! generated by a derive macro (see DESIGN.md) — callers build a [`Schema`]
//! directly with the builder methods on [`model::Schema`] and
//! [`meta::ObjectTypeDef`].

pub mod meta;
pub mod model;

pub use meta::{
    AbstractTypeDef, ArgumentDefinition, EnumTypeDef, FieldDefinition, IsTypeOf, LeafSerializer,
    ObjectTypeDef, ResolveType, ScalarTypeDef,
};
pub use model::{NamedType, Schema};

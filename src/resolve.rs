//! Resolver return values and the dynamic runtime value representation
//! resolvers produce and consume.
//!
//! Ported in spirit from `juniper::types::async_await::GraphQLValueAsync`
//! and `juniper::executor::Executor`, but dynamically typed: `juniper`
//! dispatches to a resolver through a compile-time generated `GraphQLValue`
//! impl (via `juniper_codegen`'s derive macros). That codegen crate is out
//! of scope here (see DESIGN.md), so fields here carry their resolver as a
//! boxed closure and parent values are resolved by name through the
//! [`ResolvableObject`] trait object, the way a hand-rolled dynamic schema
//! (rather than a derive-macro one) has to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::ast::Arguments;

/// An error raised by a resolver or during value completion, before it has
/// been located against a response path.
///
/// Mirrors `juniper::FieldError`, trimmed to a plain message with no
/// structured extensions.
#[derive(Debug, Clone, derive_more::Display)]
#[display("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The dynamically typed value a resolver hands back to the engine, before
/// type-directed completion.
#[derive(Clone)]
pub enum RuntimeValue {
    Null,
    /// Distinct from `Null`: a field that resolved to no value at all,
    /// whose key is dropped from the response object entirely rather than
    /// set to `null`.
    Undefined,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<RuntimeValue>),
    Object(Arc<dyn ResolvableObject>),
}

impl fmt::Debug for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Undefined => write!(f, "Undefined"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Boolean(b) => write!(f, "Boolean({b})"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl RuntimeValue {
    pub fn as_object(&self) -> Option<&Arc<dyn ResolvableObject>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RuntimeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// A parent value that can resolve its own fields by name — the default
/// field resolver's target.
pub trait ResolvableObject: Send + Sync {
    /// The concrete type name, used for the default abstract-type
    /// resolution strategy.
    fn type_name(&self) -> &str;

    /// Resolves a single field by name using this object's own data,
    /// without going through a field-specific custom resolver.
    fn resolve_field(
        &self,
        field_name: &str,
        arguments: &Arguments,
        context: &Context,
    ) -> ResolverReturn;

    /// Allows downcasting back to the concrete parent type inside custom
    /// resolvers that need it.
    fn as_any(&self) -> &dyn Any;
}

/// An opaque, downcastable context value threaded through every resolver
/// call.
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

/// Per-call metadata handed to resolvers.
#[derive(Debug, Clone)]
pub struct ResolveInfo {
    pub field_name: String,
    pub return_type: crate::ast::Type,
    pub parent_type_name: String,
    pub path: crate::ast::ResponsePath,
}

/// The normalized three-way resolver return.
pub enum ResolverReturn {
    /// A synchronously available value, already resolved or already failed.
    Value(Result<RuntimeValue, FieldError>),
    /// A one-shot future.
    Deferred(BoxFuture<'static, Result<RuntimeValue, FieldError>>),
    /// A stream of values over time.
    Stream(BoxStream<'static, Result<RuntimeValue, FieldError>>),
}

impl ResolverReturn {
    pub fn value(v: RuntimeValue) -> Self {
        Self::Value(Ok(v))
    }

    pub fn error(e: impl Into<FieldError>) -> Self {
        Self::Value(Err(e.into()))
    }

    /// Normalizes any of the three shapes into a single stream.
    pub fn into_stream(self) -> BoxStream<'static, Result<RuntimeValue, FieldError>> {
        use futures::{FutureExt, StreamExt};
        match self {
            Self::Value(result) => futures::stream::once(async move { result }).boxed(),
            Self::Deferred(fut) => fut.into_stream().boxed(),
            Self::Stream(stream) => stream,
        }
    }
}

/// The resolver attached to a field definition.
pub type Resolver = dyn Fn(&RuntimeValue, &Arguments, &Context, &ResolveInfo) -> ResolverReturn
    + Send
    + Sync;

/// The context's fallback resolver, used when a field carries no resolver
/// of its own.
pub type DefaultFieldResolver =
    dyn Fn(&RuntimeValue, &str, &Arguments, &Context) -> ResolverReturn + Send + Sync;

/// Reads the field from the parent value via [`ResolvableObject::resolve_field`].
pub fn default_field_resolver(
    parent: &RuntimeValue,
    field_name: &str,
    arguments: &Arguments,
    context: &Context,
) -> ResolverReturn {
    match parent.as_object() {
        Some(obj) => obj.resolve_field(field_name, arguments, context),
        None => ResolverReturn::value(RuntimeValue::Null),
    }
}

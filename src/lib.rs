//! A reactive execution engine for a typed query language:
//! evaluates a parsed query against a schema and a root value, producing a
//! stream of response snapshots rather than a single resolved response.
//!
//! Schema construction, query validation, and query parsing itself are out
//! of scope; `graphql-parser` plays the "existing
//! toolkit" role for parsing, and callers build a [`schema::Schema`] by hand
//! with the builders in [`schema::meta`].

pub mod ast;
pub mod executor;
pub mod resolve;
pub mod schema;
pub mod value;

pub use executor::{ExecutionContext, ExecutionError, ResponseSnapshot};
pub use value::Value;

use std::sync::Arc;

use futures::stream::Stream;

use ast::Variables;
use resolve::{Context, DefaultFieldResolver, RuntimeValue};
use schema::Schema;

/// Errors that prevent execution from starting at all.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum GraphQLError {
    #[display("{_0}")]
    ParseError(String),
    #[display("fragments are not supported")]
    UnsupportedFragment,
    #[display("unknown operation '{_0}'")]
    UnknownOperation(String),
    #[display("multiple operations provided; an operation name is required")]
    AmbiguousOperation,
    #[display("subscription operations are not supported as a distinct operation kind")]
    UnsupportedSubscriptionOperation,
}

/// Per-execution configuration, following `juniper::Executor`'s own
/// threading of a default resolver.
#[derive(Default)]
pub struct ExecutorConfig {
    pub default_field_resolver: Option<Box<DefaultFieldResolver>>,
}

/// Parses `document_source`, picks `operation_name` (or the lone operation,
/// if there's only one), and dispatches it.
pub fn execute(
    schema: Schema,
    document_source: &str,
    operation_name: Option<&str>,
    root_value: RuntimeValue,
    context_value: Context,
    variables: Variables,
    config: ExecutorConfig,
) -> Result<impl Stream<Item = ResponseSnapshot>, GraphQLError> {
    let document = ast::parse_document(document_source, operation_name)?;
    execute_document(schema, document, root_value, context_value, variables, config)
}

/// As [`execute`], but against an already-parsed [`ast::Document`].
pub fn execute_document(
    schema: Schema,
    document: ast::Document,
    root_value: RuntimeValue,
    context_value: Context,
    variables: Variables,
    config: ExecutorConfig,
) -> Result<impl Stream<Item = ResponseSnapshot>, GraphQLError> {
    let ctx = Arc::new(ExecutionContext::new(
        schema,
        document,
        context_value,
        variables,
        config.default_field_resolver,
    ));
    Ok(executor::dispatch(ctx, root_value))
}

//! The reactive execution engine: a recursive,
//! type-directed evaluator that maps a query selection tree over a schema,
//! normalizes resolver returns to streams, and composes those streams with
//! a fixed set of ordering and cancellation guarantees.
//!
//! Ported from `juniper::executor`'s overall shape (`Executor`,
//! `ExecutionError`, `execute_validated_query`), generalized from a single
//! promise-shaped resolution to a stream-combinator pipeline.

mod combinators;
mod complete;
mod context;
mod dispatch;
mod error;
mod field;
mod selection_set;

pub use context::ExecutionContext;
pub(crate) use dispatch::dispatch;

use std::sync::Mutex;

use futures::stream::BoxStream;
use serde::Serialize;

use crate::ast::ResponsePath;
use crate::resolve::FieldError;
use crate::value::Value;

/// A stream of completed field values, fully resolved per the completion
/// state machine: `Ok(Some(v))` is a live or completed value (possibly
/// `Value::Null` if a descendant's non-null violation was absorbed here),
/// `Ok(None)` means the field resolved to "undefined" and is omitted from
/// the response object entirely, `Err(())` signals
/// a non-null violation still propagating upward, already recorded in the
/// execution context's error accumulator.
pub(crate) type FieldStream = BoxStream<'static, Result<Option<Value>, ()>>;

/// An error located against the AST and response path where it occurred.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<crate::ast::SourceLocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ResponsePath>,
}

impl ExecutionError {
    pub fn new(
        error: impl Into<FieldError>,
        location: crate::ast::SourceLocation,
        path: ResponsePath,
    ) -> Self {
        let error = error.into();
        Self {
            message: error.message,
            locations: Some(vec![location]),
            path: Some(path),
        }
    }
}

/// The context's append-only error accumulator. Execution is
/// single-threaded cooperative, so a `Mutex` here is purely for interior
/// mutability through shared `&ExecutionContext` references, never contended.
pub(crate) struct ErrorSink(Mutex<Vec<ExecutionError>>);

impl ErrorSink {
    fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    pub(crate) fn push(&self, error: ExecutionError) {
        self.0.lock().unwrap().push(error);
    }

    pub(crate) fn snapshot(&self) -> Vec<ExecutionError> {
        self.0.lock().unwrap().clone()
    }
}

/// A single emission of the result stream.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ExecutionError>,
}

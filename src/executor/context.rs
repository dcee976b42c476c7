//! The immutable-per-execution context record. Ported from
//! `juniper::executor::Executor`, minus the generic `CtxT`/`S` type
//! parameters `juniper` threads through — this crate's context and scalar
//! representations are fixed (see DESIGN.md).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ast::{Document, Selection, Variables};
use crate::resolve::{default_field_resolver, Context, DefaultFieldResolver};
use crate::schema::Schema;

use super::{ErrorSink, ExecutionError};

/// Memoizes sub-selection collection by (object-type-name, field-nodes
/// pointer) so a field queried twice against the same type doesn't re-walk
/// its selection set.
pub(crate) type SelectionMemoKey = (String, usize);

pub struct ExecutionContext {
    pub(crate) schema: Schema,
    pub(crate) document: Document,
    pub(crate) context_value: Context,
    pub(crate) variables: Variables,
    pub(crate) default_resolver: Box<DefaultFieldResolver>,
    pub(crate) errors: ErrorSink,
    pub(crate) selection_memo: Mutex<HashMap<SelectionMemoKey, Vec<Selection>>>,
}

impl ExecutionContext {
    pub fn new(
        schema: Schema,
        document: Document,
        context_value: Context,
        variables: Variables,
        default_resolver: Option<Box<DefaultFieldResolver>>,
    ) -> Self {
        Self {
            schema,
            document,
            context_value,
            variables,
            default_resolver: default_resolver
                .unwrap_or_else(|| Box::new(default_field_resolver)),
            errors: ErrorSink::new(),
            selection_memo: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn record_error(&self, error: ExecutionError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> Vec<ExecutionError> {
        self.errors.snapshot()
    }
}

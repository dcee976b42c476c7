//! Selection-Set Evaluator: maps a response-key → field-nodes
//! mapping into a stream of response objects, in read (combine-latest) or
//! write (serial-then-combine-latest) mode.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};

use crate::ast::{FieldNode, ResponsePath};
use crate::resolve::RuntimeValue;
use crate::value::{Object, Value};

use super::combinators;
use super::context::ExecutionContext;
use super::field;
use super::FieldStream;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Read mode: every field starts concurrently.
    Read,
    /// Write mode: field `k` does not start until field `k-1` has produced
    /// its first value.
    Write,
}

/// Evaluates `fields` against `parent_type`/`parent_value`, returning a
/// stream of completed response objects.
///
/// `Err(())` signals that some non-null child field failed irrecoverably;
/// the caller (an enclosing Object/Abstract branch in
/// [`super::complete`], or [`super::dispatch::dispatch`] at the root)
/// decides whether to absorb that into `null` or finalize the response as
/// fatal.
pub(crate) fn evaluate(
    ctx: Arc<ExecutionContext>,
    parent_type: &str,
    parent_value: RuntimeValue,
    path: ResponsePath,
    fields: Vec<(String, Vec<FieldNode>)>,
    mode: Mode,
) -> BoxStream<'static, Result<Value, ()>> {
    // An empty fields mapping yields a stream that emits a single empty
    // object and completes.
    if fields.is_empty() {
        return stream::once(async { Ok(Value::Object(Object::with_capacity(0))) }).boxed();
    }

    let parent_type = parent_type.to_owned();

    match mode {
        Mode::Read => {
            let children: Vec<(String, FieldStream)> = fields
                .into_iter()
                .map(|(key, nodes)| {
                    let field_path = path.with_field(nodes[0].response_key());
                    let stream = field::resolve(
                        ctx.clone(),
                        &parent_type,
                        parent_value.clone(),
                        nodes,
                        field_path,
                    );
                    (key, stream)
                })
                .collect();
            assemble(children)
        }
        Mode::Write => {
            stream::once(async move {
                let mut children = Vec::with_capacity(fields.len());
                for (key, nodes) in fields {
                    let field_path = path.with_field(nodes[0].response_key());
                    let mut field_stream = field::resolve(
                        ctx.clone(),
                        &parent_type,
                        parent_value.clone(),
                        nodes,
                        field_path,
                    );
                    // Wait for this field's first emission before starting
                    // the next one; it then keeps evaluating in parallel
                    // with the rest, via the chained remainder below.
                    let first = field_stream.next().await;
                    let rest: FieldStream = match first {
                        Some(item) => {
                            stream::once(async move { item }).chain(field_stream).boxed()
                        }
                        None => stream::empty().boxed(),
                    };
                    children.push((key, rest));
                }
                assemble(children)
            })
            .flatten()
            .boxed()
        }
    }
}

/// Builds the final object stream from each field's already-started stream.
fn assemble(children: Vec<(String, FieldStream)>) -> BoxStream<'static, Result<Value, ()>> {
    combinators::combine_latest(children)
        .map(|result| match result {
            Ok(pairs) => {
                let object: Object = pairs
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v)))
                    .collect();
                Ok(Value::Object(object))
            }
            Err(()) => Err(()),
        })
        .boxed()
}

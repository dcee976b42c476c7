//! Operation Dispatcher: picks the root type for the
//! operation, collects its top-level selections, and runs them in read or
//! write mode.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};

use crate::ast::{collect_fields, OperationKind, ResponsePath};
use crate::resolve::RuntimeValue;

use super::context::ExecutionContext;
use super::selection_set::{self, Mode};
use super::ResponseSnapshot;

/// Runs the chosen operation to completion, returning the stream of
/// [`ResponseSnapshot`]s the crate's primary entry point hands back to
/// callers.
pub(crate) fn dispatch(
    ctx: Arc<ExecutionContext>,
    root_value: RuntimeValue,
) -> BoxStream<'static, ResponseSnapshot> {
    let kind = ctx.document.operation.kind;

    let Some(root_type) = ctx.schema.root_type(kind) else {
        // A schema missing its declared root type is a caller programming
        // error (schema construction is out of scope here); surfaced the
        // same way any other dispatcher-level failure is.
        return stream::once(async { ResponseSnapshot { data: None, errors: Vec::new() } }).boxed();
    };

    let root_type_name = root_type.name.clone();
    let fields = collect_fields(&ctx.document.operation.selection_set);
    let mode = match kind {
        OperationKind::Read => Mode::Read,
        OperationKind::Write => Mode::Write,
    };

    let result_stream = selection_set::evaluate(
        ctx.clone(),
        &root_type_name,
        root_value,
        ResponsePath::root(),
        fields,
        mode,
    );

    // Top-level fatal: once the root stream reports an unabsorbed non-null
    // violation, emit one final `data: null` snapshot and stop polling the
    // inner stream forever, letting it (and whatever it still held
    // subscribed) drop.
    stream::unfold(
        (result_stream, false, ctx),
        |(mut inner, done, ctx)| async move {
            if done {
                return None;
            }
            match inner.next().await {
                Some(Ok(value)) => {
                    let snapshot = ResponseSnapshot {
                        data: Some(value),
                        errors: ctx.errors(),
                    };
                    Some((snapshot, (inner, false, ctx)))
                }
                Some(Err(())) => {
                    let snapshot = ResponseSnapshot {
                        data: None,
                        errors: ctx.errors(),
                    };
                    Some((snapshot, (inner, true, ctx)))
                }
                None => None,
            }
        },
    )
    .boxed()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use futures::stream::StreamExt;

    use super::*;
    use crate::ast::{Document, FieldNode, Selection, SourceLocation};
    use crate::resolve::{Context, ResolverReturn};
    use crate::schema::{FieldDefinition, NamedType, ObjectTypeDef, Schema, ScalarTypeDef};
    use crate::value::{ScalarValue, Value};

    fn field_node(name: &str) -> FieldNode {
        FieldNode {
            name: name.to_owned(),
            alias: None,
            arguments: Vec::new(),
            selection_set: Vec::new(),
            location: SourceLocation { line: 1, column: 1 },
        }
    }

    fn ctx_with_name_field(resolved: RuntimeValue) -> Arc<ExecutionContext> {
        let resolved = Arc::new(resolved);
        let query = ObjectTypeDef::new("Query").with_field(
            FieldDefinition::new(
                "name",
                crate::ast::Type::NonNull(Box::new(crate::ast::Type::Named("String".to_owned()))),
            )
            .with_resolver(move |_p, _a, _c, _i| ResolverReturn::value((*resolved).clone())),
        );
        let string_scalar = ScalarTypeDef {
            name: "String".to_owned(),
            serialize: Arc::new(|v| match v {
                RuntimeValue::String(s) => Some(ScalarValue::String(s.clone())),
                _ => None,
            }),
        };
        let schema = Schema::new("Query")
            .with_type(NamedType::Object(query))
            .with_type(NamedType::Scalar(string_scalar));
        let document = Document {
            operation: crate::ast::Operation {
                kind: OperationKind::Read,
                selection_set: vec![Selection::Field(field_node("name"))],
            },
        };
        Arc::new(ExecutionContext::new(
            schema,
            document,
            Context::empty(),
            HashMap::new(),
            None,
        ))
    }

    #[tokio::test]
    async fn dispatch_runs_the_root_operation_and_emits_a_snapshot() {
        let ctx = ctx_with_name_field(RuntimeValue::String("hi".to_owned()));
        let mut out = dispatch(ctx, RuntimeValue::Null);
        let snapshot = out.next().await.unwrap();
        assert!(snapshot.errors.is_empty());
        let Some(Value::Object(obj)) = snapshot.data else {
            panic!("expected object data");
        };
        assert_eq!(
            obj.get_field_value("name"),
            Some(&Value::Scalar(ScalarValue::String("hi".to_owned())))
        );
        assert!(out.next().await.is_none());
    }

    #[tokio::test]
    async fn a_top_level_non_null_violation_emits_one_final_null_snapshot_then_stops() {
        let ctx = ctx_with_name_field(RuntimeValue::Null);
        let mut out = dispatch(ctx, RuntimeValue::Null);
        let snapshot = out.next().await.unwrap();
        assert!(snapshot.data.is_none());
        assert_eq!(snapshot.errors.len(), 1);
        assert!(out.next().await.is_none());
    }
}

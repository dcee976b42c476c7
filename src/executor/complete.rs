//! Value Completer: type-directed recursion that turns a raw
//! resolved value into a wire-ready [`Value`] according to the field's
//! declared output type.
//!
//! Every branch except [`Type::NonNull`] is, by construction, a "catch
//! point": it never lets a failure escape as `Err(())`, instead absorbing
//! it into `Value::Null` right there. Only `NonNull`
//! ever re-raises, by noticing its own completion came back null (or
//! undefined) and turning that into a located non-null-violation error.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};

use crate::ast::{collect_fields, FieldNode, ResponsePath, SourceLocation, Type};
use crate::resolve::RuntimeValue;
use crate::schema::{AbstractTypeDef, LeafSerializer, NamedType, ObjectTypeDef};
use crate::value::Value;

use super::combinators;
use super::context::{ExecutionContext, SelectionMemoKey};
use super::error;
use super::FieldStream;

type RawStream = BoxStream<'static, Result<RuntimeValue, ()>>;

pub(crate) fn complete(
    ctx: Arc<ExecutionContext>,
    ty: Type,
    raw: RawStream,
    parent_type_name: String,
    field_nodes: Vec<FieldNode>,
    path: ResponsePath,
) -> FieldStream {
    match ty {
        Type::NonNull(inner) => {
            complete_non_null(ctx, *inner, raw, parent_type_name, field_nodes, path)
        }
        Type::List(inner) => complete_list(ctx, *inner, raw, parent_type_name, field_nodes, path),
        Type::Named(name) => complete_named(ctx, name, raw, parent_type_name, field_nodes, path),
    }
}

fn complete_non_null(
    ctx: Arc<ExecutionContext>,
    inner: Type,
    raw: RawStream,
    parent_type_name: String,
    field_nodes: Vec<FieldNode>,
    path: ResponsePath,
) -> FieldStream {
    let location = field_nodes[0].location;
    let field_name = field_nodes[0].response_key().to_owned();
    let parent_for_message = parent_type_name.clone();
    let path_for_error = path.clone();
    let ctx_for_error = ctx.clone();

    complete(ctx, inner, raw, parent_type_name, field_nodes, path)
        .map(move |item| match item {
            Ok(Some(v)) if v.is_null() => non_null_violation(
                &ctx_for_error,
                &parent_for_message,
                &field_name,
                location,
                &path_for_error,
            ),
            Ok(None) => non_null_violation(
                &ctx_for_error,
                &parent_for_message,
                &field_name,
                location,
                &path_for_error,
            ),
            Ok(Some(v)) => Ok(Some(v)),
            Err(()) => Err(()),
        })
        .boxed()
}

fn non_null_violation(
    ctx: &ExecutionContext,
    parent_type_name: &str,
    field_name: &str,
    location: SourceLocation,
    path: &ResponsePath,
) -> Result<Option<Value>, ()> {
    error::record(
        ctx,
        format!("Cannot return null for non-nullable field '{parent_type_name}.{field_name}'."),
        location,
        path,
    );
    Err(())
}

fn once_null() -> FieldStream {
    stream::once(async { Ok(Some(Value::Null)) }).boxed()
}

fn once_none() -> FieldStream {
    stream::once(async { Ok(None) }).boxed()
}

fn complete_list(
    ctx: Arc<ExecutionContext>,
    element_type: Type,
    raw: RawStream,
    parent_type_name: String,
    field_nodes: Vec<FieldNode>,
    path: ResponsePath,
) -> FieldStream {
    let location = field_nodes[0].location;
    let response_key = field_nodes[0].response_key().to_owned();

    let build_inner = move |item: Result<RuntimeValue, ()>| {
        let ctx = ctx.clone();
        let element_type = element_type.clone();
        let parent_type_name = parent_type_name.clone();
        let field_nodes = field_nodes.clone();
        let path = path.clone();
        let response_key = response_key.clone();
        async move {
            match item {
                Err(()) => once_null(),
                Ok(RuntimeValue::Undefined) => once_none(),
                Ok(RuntimeValue::List(items)) => {
                    let children: Vec<(usize, FieldStream)> = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, element)| {
                            let elem_path = path.with_index(i);
                            let elem_stream: RawStream =
                                stream::once(async move { Ok(element) }).boxed();
                            let completed = complete(
                                ctx.clone(),
                                element_type.clone(),
                                elem_stream,
                                parent_type_name.clone(),
                                field_nodes.clone(),
                                elem_path,
                            );
                            (i, completed)
                        })
                        .collect();
                    combinators::combine_latest(children)
                        .map(|result| match result {
                            Ok(pairs) => {
                                let values: Vec<Value> = pairs
                                    .into_iter()
                                    .map(|(_, v)| v.unwrap_or(Value::Null))
                                    .collect();
                                Ok(Some(Value::List(values)))
                            }
                            // List is a bare (nullable) type: a non-null
                            // element violation nulls the whole list rather
                            // than escaping further.
                            Err(()) => Ok(Some(Value::Null)),
                        })
                        .boxed()
                }
                Ok(_) => {
                    error::record(
                        &ctx,
                        format!(
                            "Expected Iterable, but did not find one for field '{response_key}'."
                        ),
                        location,
                        &path,
                    );
                    once_null()
                }
            }
        }
    };

    combinators::switch_map(raw, build_inner)
}

fn complete_named(
    ctx: Arc<ExecutionContext>,
    type_name: String,
    raw: RawStream,
    // The object/abstract branches derive their own new parent-type name
    // from the resolved concrete type, so the parent the *field* was
    // declared on is irrelevant past this point.
    _parent_type_name: String,
    field_nodes: Vec<FieldNode>,
    path: ResponsePath,
) -> FieldStream {
    let location = field_nodes[0].location;
    let response_key = field_nodes[0].response_key().to_owned();

    let build_inner = move |item: Result<RuntimeValue, ()>| {
        let ctx = ctx.clone();
        let type_name = type_name.clone();
        let field_nodes = field_nodes.clone();
        let path = path.clone();
        let response_key = response_key.clone();
        async move {
            let value = match item {
                Err(()) => return once_null(),
                Ok(RuntimeValue::Undefined) => return once_none(),
                // A named type is always nullable by construction (only
                // `Type::NonNull` wraps one into a non-null slot); a
                // resolved `Null` completes straight through regardless of
                // whether the named type is a leaf, object, or abstract.
                Ok(RuntimeValue::Null) => return once_null(),
                Ok(v) => v,
            };

            let Some(named) = ctx.schema.named_type(&type_name) else {
                error::record(&ctx, format!("Unknown type '{type_name}'."), location, &path);
                return once_null();
            };

            match named {
                NamedType::Scalar(scalar) => {
                    complete_leaf_value(&ctx, &scalar.serialize, &value, &response_key, location, &path)
                }
                NamedType::Enum(en) => {
                    complete_leaf_value(&ctx, &en.serialize, &value, &response_key, location, &path)
                }
                NamedType::Object(obj) => {
                    resolve_object_stream(ctx.clone(), obj, value, &field_nodes, &path).await
                }
                NamedType::Abstract(abs) => {
                    complete_abstract_value(ctx.clone(), abs, value, &field_nodes, &path).await
                }
            }
        }
    };

    combinators::switch_map(raw, build_inner)
}

fn complete_leaf_value(
    ctx: &ExecutionContext,
    serialize: &LeafSerializer,
    value: &RuntimeValue,
    response_key: &str,
    location: SourceLocation,
    path: &ResponsePath,
) -> FieldStream {
    match serialize(value) {
        Some(scalar) if !scalar.is_invalid() => {
            stream::once(async move { Ok(Some(Value::Scalar(scalar))) }).boxed()
        }
        _ => {
            error::record(
                ctx,
                format!("Unable to serialize value as scalar for field '{response_key}'."),
                location,
                path,
            );
            once_null()
        }
    }
}

async fn resolve_object_stream(
    ctx: Arc<ExecutionContext>,
    obj: &ObjectTypeDef,
    value: RuntimeValue,
    field_nodes: &[FieldNode],
    path: &ResponsePath,
) -> FieldStream {
    if let Some(is_type_of) = &obj.is_type_of {
        let matched = is_type_of(&value)
            .into_stream()
            .next()
            .await
            .and_then(|r| r.ok())
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !matched {
            error::record(
                &ctx,
                format!(
                    "Expected value of type '{}' but got incompatible value for field '{}'.",
                    obj.name,
                    field_nodes[0].response_key()
                ),
                field_nodes[0].location,
                path,
            );
            return once_null();
        }
    }

    let sub_selection = collect_sub_selection(&ctx, &obj.name, field_nodes);
    let grouped = collect_fields(&sub_selection);
    let stream = super::selection_set::evaluate(
        ctx.clone(),
        &obj.name,
        value,
        path.clone(),
        grouped,
        super::selection_set::Mode::Read,
    );
    stream
        .map(|result| match result {
            Ok(v) => Ok(Some(v)),
            // Object is a bare (nullable) type: absorb here.
            Err(()) => Ok(Some(Value::Null)),
        })
        .boxed()
}

async fn complete_abstract_value(
    ctx: Arc<ExecutionContext>,
    abs: &AbstractTypeDef,
    value: RuntimeValue,
    field_nodes: &[FieldNode],
    path: &ResponsePath,
) -> FieldStream {
    let Some(concrete_name) = resolve_runtime_type(&ctx, abs, &value).await else {
        error::record(
            &ctx,
            format!(
                "Abstract type '{}' must resolve to an Object type at runtime for field '{}'.",
                abs.name,
                field_nodes[0].response_key()
            ),
            field_nodes[0].location,
            path,
        );
        return once_null();
    };

    if !ctx.schema.is_possible_type(abs, &concrete_name) {
        error::record(
            &ctx,
            format!(
                "Runtime Object type '{concrete_name}' is not a possible type for '{}'.",
                abs.name
            ),
            field_nodes[0].location,
            path,
        );
        return once_null();
    }

    let Some(NamedType::Object(obj)) = ctx.schema.named_type(&concrete_name) else {
        error::record(
            &ctx,
            format!("Runtime Object type '{concrete_name}' is not defined as an Object."),
            field_nodes[0].location,
            path,
        );
        return once_null();
    };

    resolve_object_stream(ctx.clone(), obj, value, field_nodes, path).await
}

/// Default runtime-type resolution strategy: prefer an explicit `resolveType`,
/// else the value's own reported type name, else the first `isTypeOf` match
/// in declaration order, each checked concurrently.
async fn resolve_runtime_type(
    ctx: &ExecutionContext,
    abs: &AbstractTypeDef,
    value: &RuntimeValue,
) -> Option<String> {
    if let Some(resolve_type) = &abs.resolve_type {
        return resolve_type(value)
            .into_stream()
            .next()
            .await
            .and_then(|r| r.ok())
            .and_then(|v| v.as_str().map(str::to_owned));
    }

    if let Some(obj) = value.as_object() {
        return Some(obj.type_name().to_owned());
    }

    let possible = ctx.schema.possible_types(abs);
    let checks = possible.iter().map(|candidate| async move {
        match &candidate.is_type_of {
            Some(is_type_of) => is_type_of(value)
                .into_stream()
                .next()
                .await
                .and_then(|r| r.ok())
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            None => false,
        }
    });
    let results = futures::future::join_all(checks).await;
    possible
        .iter()
        .zip(results)
        .find(|(_, matched)| *matched)
        .map(|(candidate, _)| candidate.name.clone())
}

/// Memoizes sub-selection collection by (object-type-name, field-nodes
/// identity) so a field queried twice against the same type doesn't re-walk
/// its selection set.
fn collect_sub_selection(
    ctx: &ExecutionContext,
    type_name: &str,
    field_nodes: &[FieldNode],
) -> Vec<crate::ast::Selection> {
    let key: SelectionMemoKey = (type_name.to_owned(), field_nodes.as_ptr() as usize);
    if let Some(cached) = ctx.selection_memo.lock().unwrap().get(&key) {
        return cached.clone();
    }
    let merged: Vec<crate::ast::Selection> = field_nodes
        .iter()
        .flat_map(|f| f.selection_set.clone())
        .collect();
    ctx.selection_memo
        .lock()
        .unwrap()
        .insert(key, merged.clone());
    merged
}

#[cfg(test)]
mod tests {
    use futures::stream::{self, StreamExt};

    use super::*;
    use crate::ast::{Document, Operation, OperationKind, SourceLocation};
    use crate::resolve::Context;
    use crate::schema::{NamedType, ScalarTypeDef};
    use crate::value::ScalarValue;

    fn ctx_with_string_scalar() -> Arc<ExecutionContext> {
        let schema = crate::schema::Schema::new("Query").with_type(NamedType::Scalar(ScalarTypeDef {
            name: "String".to_owned(),
            serialize: Arc::new(|v| match v {
                RuntimeValue::String(s) => Some(ScalarValue::String(s.clone())),
                _ => None,
            }),
        }));
        let document = Document {
            operation: Operation {
                kind: OperationKind::Read,
                selection_set: Vec::new(),
            },
        };
        Arc::new(ExecutionContext::new(
            schema,
            document,
            Context::empty(),
            std::collections::HashMap::new(),
            None,
        ))
    }

    fn field_node(name: &str) -> FieldNode {
        FieldNode {
            name: name.to_owned(),
            alias: None,
            arguments: Vec::new(),
            selection_set: Vec::new(),
            location: SourceLocation { line: 1, column: 1 },
        }
    }

    fn raw(value: Result<RuntimeValue, ()>) -> RawStream {
        stream::once(async move { value }).boxed()
    }

    #[tokio::test]
    async fn non_null_violation_is_recorded_and_propagated() {
        let ctx = ctx_with_string_scalar();
        let ty = Type::NonNull(Box::new(Type::Named("String".to_owned())));
        let mut out = complete(
            ctx.clone(),
            ty,
            raw(Ok(RuntimeValue::Null)),
            "Query".to_owned(),
            vec![field_node("name")],
            ResponsePath::root(),
        );
        assert_eq!(out.next().await, Some(Err(())));
        let errors = ctx.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Query.name"));
    }

    #[tokio::test]
    async fn resolved_null_absorbs_cleanly_at_a_nullable_named_type() {
        let ctx = ctx_with_string_scalar();
        let ty = Type::Named("String".to_owned());
        let mut out = complete(
            ctx.clone(),
            ty,
            raw(Ok(RuntimeValue::Null)),
            "Query".to_owned(),
            vec![field_node("name")],
            ResponsePath::root(),
        );
        assert_eq!(out.next().await, Some(Ok(Some(Value::Null))));
        assert!(ctx.errors().is_empty());
    }

    #[tokio::test]
    async fn scalar_leaf_serializes_through() {
        let ctx = ctx_with_string_scalar();
        let ty = Type::Named("String".to_owned());
        let mut out = complete(
            ctx,
            ty,
            raw(Ok(RuntimeValue::String("discovery".to_owned()))),
            "Query".to_owned(),
            vec![field_node("name")],
            ResponsePath::root(),
        );
        assert_eq!(
            out.next().await,
            Some(Ok(Some(Value::Scalar(ScalarValue::String(
                "discovery".to_owned()
            )))))
        );
    }

    #[tokio::test]
    async fn a_non_null_element_violation_nulls_the_whole_bare_list() {
        let ctx = ctx_with_string_scalar();
        let element_type = Type::NonNull(Box::new(Type::Named("String".to_owned())));
        let list_raw: RawStream = stream::once(async {
            Ok(RuntimeValue::List(vec![
                RuntimeValue::String("a".to_owned()),
                RuntimeValue::Null,
            ]))
        })
        .boxed();
        let mut out = complete_list(
            ctx,
            element_type,
            list_raw,
            "Query".to_owned(),
            vec![field_node("names")],
            ResponsePath::root(),
        );
        assert_eq!(out.next().await, Some(Ok(Some(Value::Null))));
    }
}

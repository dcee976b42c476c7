//! Field Resolver: looks up a field definition, coerces its
//! arguments, invokes its resolver (or the context's default), and hands the
//! normalized stream off to the Value Completer.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::ast::{coerce_arguments, FieldNode, ResponsePath};
use crate::resolve::{ResolveInfo, RuntimeValue};
use crate::schema::NamedType;

use super::complete;
use super::context::ExecutionContext;
use super::error;
use super::FieldStream;

/// Resolves one response-key's field nodes against `parent_type_name`/
/// `parent_value`.
///
/// Adopts the reference-aligned semantics for unknown fields: a field absent from the parent
/// type is a hard, located error rather than a silently-omitted key.
pub(crate) fn resolve(
    ctx: Arc<ExecutionContext>,
    parent_type_name: &str,
    parent_value: RuntimeValue,
    field_nodes: Vec<FieldNode>,
    path: ResponsePath,
) -> FieldStream {
    let first = field_nodes[0].clone();

    let field_def = ctx
        .schema
        .named_type(parent_type_name)
        .and_then(NamedType::as_object)
        .and_then(|obj| obj.fields.get(&first.name));

    let Some(field_def) = field_def else {
        let message = error::field_not_found_message(
            &first.name,
            ctx.schema.named_type(parent_type_name),
            parent_type_name,
        );
        error::record(&ctx, message, first.location, &path);
        return stream::once(async { Err(()) }).boxed();
    };

    let args = coerce_arguments(&first, &ctx.variables);
    let info = ResolveInfo {
        field_name: first.name.clone(),
        return_type: field_def.output_type.clone(),
        parent_type_name: parent_type_name.to_owned(),
        path: path.clone(),
    };

    let resolver_return = match &field_def.resolver {
        Some(resolver) => resolver(&parent_value, &args, &ctx.context_value, &info),
        None => (ctx.default_resolver)(&parent_value, &first.name, &args, &ctx.context_value),
    };

    let output_type = field_def.output_type.clone();
    let raw_stream = resolver_return.into_stream();

    let location = first.location;
    let path_for_errors = path.clone();
    let ctx_for_errors = ctx.clone();
    let value_stream = raw_stream
        .map(move |item| match item {
            Ok(v) => Ok(v),
            Err(field_error) => {
                error::record(&ctx_for_errors, field_error, location, &path_for_errors);
                Err(())
            }
        })
        .boxed();

    complete::complete(
        ctx,
        output_type,
        value_stream,
        parent_type_name.to_owned(),
        field_nodes,
        path,
    )
}

//! The engine's own minimal query AST, adapted from the document produced
//! by the external parsing toolkit (`graphql_parser::query`).
//!
//! Query parsing itself is treated as someone else's job; `graphql-parser`
//! (already an optional dependency of `juniper`, gated behind its
//! `schema-language` feature) plays that role here. [`from_parsed`] is the
//! adapter boundary: everything past it is this crate's own, minimal
//! representation.

use std::collections::HashMap;
use std::fmt;

use graphql_parser::query as q;

use crate::GraphQLError;

/// A declared GraphQL output (or input) type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Named(String),
    NonNull(Box<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The innermost named type, stripping all `NonNull`/`List` wrappers.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) => n,
            Self::NonNull(inner) | Self::List(inner) => inner.innermost_name(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// A single AST scalar/list/object input literal, or a variable reference.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Null,
    Variable(String),
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

/// Runtime argument bindings, after coercing AST argument literals against
/// variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: HashMap<String, InputValue>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(InputValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.values.get(name) {
            Some(InputValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(InputValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Variable bindings supplied by the caller.
pub type Variables = HashMap<String, InputValue>;

/// A single field selection node.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Vec<(String, InputValue)>,
    pub selection_set: Vec<Selection>,
    pub location: SourceLocation,
}

impl FieldNode {
    /// The key this field contributes under in the response object:
    /// the alias if present, else the field name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// A member of a selection set.
///
/// Only field selections are representable: fragment spreads and inline
/// fragments are a Non-goal and are rejected during
/// [`from_parsed`] with a [`GraphQLError`].
#[derive(Debug, Clone)]
pub enum Selection {
    Field(FieldNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub operation: Operation,
}

/// Collects the top-level (or nested) selections of a field into an ordered
/// response-key → field-nodes mapping.
///
/// Grouping by response key (rather than assuming one node per key) mirrors
/// `juniper::executor::collect_fields`/`grouped_field_set`, even though
/// without fragment support a response key practically always maps to
/// exactly one node here.
pub fn collect_fields(selection_set: &[Selection]) -> Vec<(String, Vec<FieldNode>)> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<FieldNode>> = HashMap::new();
    for selection in selection_set {
        let Selection::Field(field) = selection;
        let key = field.response_key().to_owned();
        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }
        grouped.entry(key).or_default().push(field.clone());
    }
    order
        .into_iter()
        .map(|key| {
            let nodes = grouped.remove(&key).unwrap_or_default();
            (key, nodes)
        })
        .collect()
}

/// Coerces a field node's AST arguments against variable bindings into a
/// runtime argument map.
pub fn coerce_arguments(field: &FieldNode, variables: &Variables) -> Arguments {
    let mut values = HashMap::with_capacity(field.arguments.len());
    for (name, value) in &field.arguments {
        let resolved = resolve_variable(value.clone(), variables);
        values.insert(name.clone(), resolved);
    }
    Arguments { values }
}

fn resolve_variable(value: InputValue, variables: &Variables) -> InputValue {
    match value {
        InputValue::Variable(name) => variables.get(&name).cloned().unwrap_or(InputValue::Null),
        InputValue::List(items) => InputValue::List(
            items
                .into_iter()
                .map(|v| resolve_variable(v, variables))
                .collect(),
        ),
        InputValue::Object(fields) => InputValue::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, resolve_variable(v, variables)))
                .collect(),
        ),
        other => other,
    }
}

/// Parses a query source string via the external toolkit and adapts it into
/// this crate's own [`Document`].
pub fn parse_document(source: &str, operation_name: Option<&str>) -> Result<Document, GraphQLError> {
    let parsed = q::parse_query::<&str>(source)
        .map_err(|e| GraphQLError::ParseError(e.to_string()))?;
    from_parsed(parsed, operation_name)
}

fn from_parsed<'a>(
    parsed: q::Document<'a, &'a str>,
    operation_name: Option<&str>,
) -> Result<Document, GraphQLError> {
    let mut operations: Vec<(Option<&str>, &q::OperationDefinition<'a, &'a str>)> = Vec::new();
    for def in &parsed.definitions {
        match def {
            q::Definition::Operation(op) => operations.push((operation_name_of(op), op)),
            q::Definition::Fragment(_) => {
                return Err(GraphQLError::UnsupportedFragment);
            }
        }
    }

    let chosen = if let Some(wanted) = operation_name {
        operations
            .iter()
            .find(|(name, _)| *name == Some(wanted))
            .map(|(_, op)| *op)
            .ok_or_else(|| GraphQLError::UnknownOperation(wanted.to_owned()))?
    } else if operations.len() == 1 {
        operations[0].1
    } else {
        return Err(GraphQLError::AmbiguousOperation);
    };

    let (kind, selection_set) = match chosen {
        q::OperationDefinition::SelectionSet(set) => (OperationKind::Read, set),
        q::OperationDefinition::Query(query) => (OperationKind::Read, &query.selection_set),
        q::OperationDefinition::Mutation(mutation) => (OperationKind::Write, &mutation.selection_set),
        q::OperationDefinition::Subscription(_) => {
            return Err(GraphQLError::UnsupportedSubscriptionOperation);
        }
    };

    Ok(Document {
        operation: Operation {
            kind,
            selection_set: convert_selection_set(selection_set)?,
        },
    })
}

fn operation_name_of<'a>(op: &q::OperationDefinition<'a, &'a str>) -> Option<&'a str> {
    match op {
        q::OperationDefinition::SelectionSet(_) => None,
        q::OperationDefinition::Query(q) => q.name,
        q::OperationDefinition::Mutation(m) => m.name,
        q::OperationDefinition::Subscription(s) => s.name,
    }
}

fn convert_selection_set<'a>(
    set: &q::SelectionSet<'a, &'a str>,
) -> Result<Vec<Selection>, GraphQLError> {
    set.items.iter().map(convert_selection).collect()
}

fn convert_selection<'a>(selection: &q::Selection<'a, &'a str>) -> Result<Selection, GraphQLError> {
    match selection {
        q::Selection::Field(field) => Ok(Selection::Field(FieldNode {
            name: field.name.to_owned(),
            alias: field.alias.map(|a| a.to_owned()),
            arguments: field
                .arguments
                .iter()
                .map(|(name, value)| ((*name).to_owned(), convert_value(value)))
                .collect(),
            selection_set: convert_selection_set(&field.selection_set)?,
            location: SourceLocation {
                line: field.position.line as u32,
                column: field.position.column as u32,
            },
        })),
        q::Selection::FragmentSpread(_) | q::Selection::InlineFragment(_) => {
            Err(GraphQLError::UnsupportedFragment)
        }
    }
}

fn convert_value<'a>(value: &q::Value<'a, &'a str>) -> InputValue {
    match value {
        q::Value::Variable(name) => InputValue::Variable((*name).to_owned()),
        q::Value::Int(i) => InputValue::Int(i.as_i64().unwrap_or_default() as i32),
        q::Value::Float(f) => InputValue::Float(*f),
        q::Value::String(s) => InputValue::String(s.clone()),
        q::Value::Boolean(b) => InputValue::Boolean(*b),
        q::Value::Null => InputValue::Null,
        q::Value::Enum(e) => InputValue::String((*e).to_owned()),
        q::Value::List(items) => InputValue::List(items.iter().map(convert_value).collect()),
        q::Value::Object(fields) => InputValue::Object(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), convert_value(v)))
                .collect(),
        ),
    }
}

/// A response path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// A linked path from the root to the current field, rendered as a JSON
/// array when attached to errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn with_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    pub fn with_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl serde::Serialize for ResponsePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => seq.serialize_element(name)?,
                PathSegment::Index(i) => seq.serialize_element(i)?,
            }
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_name_strips_wrappers() {
        let ty = Type::NonNull(Box::new(Type::List(Box::new(Type::NonNull(Box::new(
            Type::Named("Shuttle".to_owned()),
        ))))));
        assert_eq!(ty.innermost_name(), "Shuttle");
        assert!(ty.is_non_null());
    }

    #[test]
    fn type_display_renders_graphql_syntax() {
        let ty = Type::NonNull(Box::new(Type::List(Box::new(Type::Named(
            "String".to_owned(),
        )))));
        assert_eq!(ty.to_string(), "[String]!");
    }

    #[test]
    fn collect_fields_preserves_selection_order_and_groups_aliases() {
        let field = |name: &str, alias: Option<&str>| FieldNode {
            name: name.to_owned(),
            alias: alias.map(str::to_owned),
            arguments: Vec::new(),
            selection_set: Vec::new(),
            location: SourceLocation { line: 1, column: 1 },
        };
        let selections = vec![
            Selection::Field(field("name", None)),
            Selection::Field(field("launched", Some("alias"))),
        ];
        let grouped = collect_fields(&selections);
        assert_eq!(
            grouped.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(),
            vec!["name".to_owned(), "alias".to_owned()]
        );
    }

    #[test]
    fn coerce_arguments_substitutes_variables() {
        let field = FieldNode {
            name: "launched".to_owned(),
            alias: None,
            arguments: vec![("name".to_owned(), InputValue::Variable("n".to_owned()))],
            selection_set: Vec::new(),
            location: SourceLocation { line: 1, column: 1 },
        };
        let mut variables: Variables = HashMap::new();
        variables.insert("n".to_owned(), InputValue::String("apollo11".to_owned()));

        let args = coerce_arguments(&field, &variables);
        assert_eq!(args.get_string("name"), Some("apollo11"));
    }

    #[test]
    fn coerce_arguments_defaults_unbound_variable_to_null() {
        let field = FieldNode {
            name: "launched".to_owned(),
            alias: None,
            arguments: vec![("name".to_owned(), InputValue::Variable("missing".to_owned()))],
            selection_set: Vec::new(),
            location: SourceLocation { line: 1, column: 1 },
        };
        let variables: Variables = HashMap::new();
        let args = coerce_arguments(&field, &variables);
        assert_eq!(args.get("name"), Some(&InputValue::Null));
    }

    #[test]
    fn parse_document_rejects_fragment_spreads() {
        let err = parse_document("{ launched { ...frag } } fragment frag on Shuttle { name }", None)
            .unwrap_err();
        assert!(matches!(err, GraphQLError::UnsupportedFragment));
    }

    #[test]
    fn parse_document_requires_operation_name_when_ambiguous() {
        let err = parse_document(
            "query One { a } query Two { b }",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, GraphQLError::AmbiguousOperation));
    }

    #[test]
    fn parse_document_picks_named_operation() {
        let doc = parse_document("query One { a } query Two { b }", Some("Two")).unwrap();
        let Selection::Field(field) = &doc.operation.selection_set[0];
        assert_eq!(field.name, "b");
    }

    #[test]
    fn parse_document_rejects_subscriptions() {
        let err = parse_document("subscription { launched { name } }", None).unwrap_err();
        assert!(matches!(
            err,
            GraphQLError::UnsupportedSubscriptionOperation
        ));
    }
}

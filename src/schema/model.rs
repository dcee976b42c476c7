//! The schema container, ported from `juniper::schema::model::SchemaType`.

use fnv::FnvHashMap;

use super::meta::{AbstractTypeDef, EnumTypeDef, ObjectTypeDef, ScalarTypeDef};

/// A named type in the schema's type system.
pub enum NamedType {
    Scalar(ScalarTypeDef),
    Enum(EnumTypeDef),
    Object(ObjectTypeDef),
    /// Interfaces and unions share a representation: both are "abstract"
    /// and completed identically.
    Abstract(AbstractTypeDef),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::Abstract(t) => &t.name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Abstract(_))
    }

    pub fn as_object(&self) -> Option<&ObjectTypeDef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_abstract(&self) -> Option<&AbstractTypeDef> {
        match self {
            Self::Abstract(a) => Some(a),
            _ => None,
        }
    }

    /// The `<hint>` text for the field-not-found message.
    pub fn field_not_found_hint(&self, object_field_names: &[String]) -> String {
        match self {
            Self::Scalar(_) => {
                "The field has a scalar type, which means it supports no nesting.".to_owned()
            }
            Self::Enum(_) => {
                "The field has an enum type, which means it supports no nesting.".to_owned()
            }
            Self::Object(_) => format!(
                "The only fields found in this Object are: `{}`.",
                object_field_names.join(", ")
            ),
            Self::Abstract(_) => String::new(),
        }
    }
}

/// The executable schema: root types plus the full named-type map.
pub struct Schema {
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub types: FnvHashMap<String, NamedType>,
}

impl Schema {
    pub fn new(query_type: impl Into<String>) -> Self {
        Self {
            query_type: query_type.into(),
            mutation_type: None,
            types: FnvHashMap::default(),
        }
    }

    pub fn with_mutation_type(mut self, mutation_type: impl Into<String>) -> Self {
        self.mutation_type = Some(mutation_type.into());
        self
    }

    pub fn with_type(mut self, named_type: NamedType) -> Self {
        self.types.insert(named_type.name().to_owned(), named_type);
        self
    }

    pub fn named_type(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// Root object type for the given operation kind.
    pub fn root_type(&self, kind: crate::ast::OperationKind) -> Option<&ObjectTypeDef> {
        let name = match kind {
            crate::ast::OperationKind::Read => &self.query_type,
            crate::ast::OperationKind::Write => self.mutation_type.as_ref()?,
        };
        self.named_type(name)?.as_object()
    }

    /// Concrete object types permitted for an abstract type.
    pub fn possible_types(&self, abstract_type: &AbstractTypeDef) -> Vec<&ObjectTypeDef> {
        abstract_type
            .possible_types
            .iter()
            .filter_map(|name| self.named_type(name).and_then(NamedType::as_object))
            .collect()
    }

    pub fn is_possible_type(&self, abstract_type: &AbstractTypeDef, type_name: &str) -> bool {
        abstract_type.possible_types.iter().any(|n| n == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::meta::{EnumTypeDef, ScalarTypeDef};

    #[test]
    fn field_not_found_hint_covers_all_four_categories() {
        let scalar = NamedType::Scalar(ScalarTypeDef {
            name: "String".to_owned(),
            serialize: std::sync::Arc::new(|_| None),
        });
        assert!(scalar.field_not_found_hint(&[]).contains("scalar type"));

        let en = NamedType::Enum(EnumTypeDef {
            name: "Status".to_owned(),
            values: Vec::new(),
            serialize: std::sync::Arc::new(|_| None),
        });
        assert!(en.field_not_found_hint(&[]).contains("enum type"));

        let object = NamedType::Object(ObjectTypeDef::new("Shuttle"));
        let hint = object.field_not_found_hint(&["name".to_owned(), "crew".to_owned()]);
        assert!(hint.contains("`name, crew`"));

        let abs = NamedType::Abstract(AbstractTypeDef::new("Vehicle", Vec::new()));
        assert!(abs.field_not_found_hint(&[]).is_empty());
    }

    #[test]
    fn root_type_looks_up_query_and_mutation_by_declared_name() {
        let schema = Schema::new("Query")
            .with_mutation_type("Mutation")
            .with_type(NamedType::Object(ObjectTypeDef::new("Query")))
            .with_type(NamedType::Object(ObjectTypeDef::new("Mutation")));

        assert!(schema.root_type(crate::ast::OperationKind::Read).is_some());
        assert!(schema.root_type(crate::ast::OperationKind::Write).is_some());
    }

    #[test]
    fn possible_types_filters_to_declared_object_types_only() {
        let abs = AbstractTypeDef::new("Vehicle", vec!["Shuttle".to_owned(), "Unknown".to_owned()]);
        let schema = Schema::new("Query").with_type(NamedType::Object(ObjectTypeDef::new("Shuttle")));
        let possible = schema.possible_types(&abs);
        assert_eq!(possible.len(), 1);
        assert_eq!(possible[0].name, "Shuttle");
    }
}

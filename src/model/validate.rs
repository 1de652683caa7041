//! Entity validation against per-type schemas.
//!
//! Validation never fails: it returns every problem it finds as a
//! [`ValidationError`], so a whole model can be checked in one pass.

use std::fmt;
use std::sync::Arc;

use super::model::Model;
use super::registry::{self, AT_LOCATIONS};
use super::value::{Record, Value};

// ============================================================================
// SCHEMAS
// ============================================================================

/// Primitive type a field must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    /// Name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Integer(_) | Value::Real(_))
                | (Self::Boolean, Value::Boolean(_))
                | (Self::Object, Value::Record(_))
                | (Self::Array, Value::List(_))
        )
    }
}

/// Constraint on one field.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
    /// Minimum length for array fields.
    pub min_items: Option<usize>,
    /// Type every element of an array field must have.
    pub items: Option<FieldType>,
}

const fn field(name: &'static str, kind: FieldType, required: bool) -> FieldRule {
    FieldRule { name, kind, required, min_items: None, items: None }
}

const fn located(required: bool, min_items: Option<usize>) -> FieldRule {
    FieldRule {
        name: AT_LOCATIONS,
        kind: FieldType::Array,
        required,
        min_items,
        items: Some(FieldType::String),
    }
}

/// Schema for one entity type.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: &'static [FieldRule],
}

use FieldType::{Array, Boolean, Number, Object, String as Str};

/// All entity schemas. Unknown fields are always allowed.
pub const SCHEMAS: &[Schema] = &[
    Schema {
        type_name: "location",
        fields: &[field("id", Str, true), located(false, None), field("type", Str, false)],
    },
    Schema {
        type_name: "edge",
        fields: &[
            field("source", Str, true),
            field("target", Str, true),
            field("kind", Str, false),
            field("directed", Boolean, false),
        ],
    },
    Schema {
        type_name: "item",
        fields: &[
            field("id", Str, true),
            field("name", Str, true),
            field("type", Str, false),
            located(true, Some(1)),
        ],
    },
    Schema {
        type_name: "data",
        fields: &[
            field("id", Str, true),
            field("name", Str, true),
            field("value", Str, true),
            field("type", Str, false),
            located(true, Some(1)),
        ],
    },
    Schema {
        type_name: "actor",
        fields: &[field("id", Str, true), field("type", Str, false), located(true, Some(1))],
    },
    Schema {
        type_name: "policy",
        fields: &[
            field("id", Str, true),
            field("enabled", Object, true),
            field("credentials", Object, true),
            located(true, Some(1)),
        ],
    },
    Schema {
        type_name: "process",
        fields: &[field("id", Str, true), field("actions", Object, true), located(true, Some(1))],
    },
    Schema {
        type_name: "predicate",
        fields: &[
            field("id", Str, true),
            field("arity", Number, true),
            // tuples of argument names
            FieldRule {
                name: "value",
                kind: Array,
                required: true,
                min_items: Some(1),
                items: Some(Array),
            },
        ],
    },
    Schema {
        type_name: "metric",
        fields: &[field("name", Str, true), field("value", Str, true), field("namespace", Str, false)],
    },
];

/// Look up the schema for an entity type name.
pub fn schema(type_name: &str) -> Option<&'static Schema> {
    SCHEMAS.iter().find(|s| s.type_name == type_name)
}

// ============================================================================
// ERRORS
// ============================================================================

/// Which constraint a validation error comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    Required,
    Type { expected: FieldType },
    MinItems { expected: usize },
    ItemType { expected: FieldType },
    UnknownType,
}

/// One validation problem, with a user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Entity type the schema was looked up by.
    pub type_name: Arc<str>,
    /// Offending field, if the problem is about a field.
    pub property: Option<&'static str>,
    pub violation: Violation,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Display label of an entity: its name, else its id, else `(unnamed <type>)`.
pub fn label(entity: &Record, type_name: &str) -> String {
    ["name", "id"]
        .iter()
        .filter_map(|key| entity.get(*key))
        .find(|value| value.is_truthy())
        .and_then(|value| value.join_words())
        .unwrap_or_else(|| format!("(unnamed {type_name})"))
}

/// Validate one entity against the schema of `type_name`.
///
/// An unknown type name yields a single [`Violation::UnknownType`] error.
pub fn validate_component(entity: &Record, type_name: &str) -> Vec<ValidationError> {
    let Some(schema) = schema(type_name) else {
        return vec![ValidationError {
            type_name: Arc::from(type_name),
            property: None,
            violation: Violation::UnknownType,
            message: format!("no schema for entity type `{type_name}`"),
        }];
    };

    let violations = schema.fields.iter().filter_map(|rule| {
        let violation = match entity.get(rule.name) {
            None if rule.required => Violation::Required,
            None => return None,
            Some(value) if !rule.kind.accepts(value) => Violation::Type { expected: rule.kind },
            Some(Value::List(items)) => match (rule.min_items, rule.items) {
                (Some(min), _) if items.len() < min => Violation::MinItems { expected: min },
                (_, Some(kind)) if !items.iter().all(|item| kind.accepts(item)) => {
                    Violation::ItemType { expected: kind }
                }
                _ => return None,
            },
            Some(_) => return None,
        };
        Some((rule.name, violation))
    });

    let violations: Vec<_> = violations.collect();
    if violations.is_empty() {
        return Vec::new();
    }

    let label = label(entity, type_name);
    violations
        .into_iter()
        .map(|(property, violation)| {
            let message = if property == AT_LOCATIONS {
                format!("{label} must be located somewhere")
            } else {
                let detail = match &violation {
                    Violation::Required => "is required".to_string(),
                    Violation::Type { expected } => format!("must be of {} type", expected.as_str()),
                    Violation::MinItems { expected } => {
                        format!("must contain more than {expected} items")
                    }
                    Violation::ItemType { expected } => {
                        format!("items must be of {} type", expected.as_str())
                    }
                    Violation::UnknownType => "has no schema".to_string(),
                };
                format!("{label}: {property} {detail}")
            };
            ValidationError {
                type_name: Arc::from(type_name),
                property: Some(property),
                violation,
                message,
            }
        })
        .collect()
}

/// Validate every entity of every registered collection.
///
/// Errors are ordered by collection, then by entity.
pub fn validate_model(model: &Model) -> Vec<ValidationError> {
    model
        .collections()
        .filter_map(|(plural, entities)| registry::singular(plural).map(|s| (s, entities)))
        .flat_map(|(type_name, entities)| {
            entities
                .iter()
                .flat_map(move |entity| validate_component(entity, type_name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::record;

    #[test]
    fn test_actor_without_location_or_id() {
        let errors = validate_component(&record([("type", "person".into())]), "actor");
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "(unnamed actor): id is required",
                "(unnamed actor) must be located somewhere"
            ]
        );
    }

    #[test]
    fn test_label_prefers_name() {
        let entity = record([("id", "d1".into()), ("name", "Secret".into())]);
        let errors = validate_component(&entity, "data");
        assert!(errors.iter().all(|e| e.message.starts_with("Secret")));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_type_and_min_items() {
        let predicate = record([
            ("id", "isUserId".into()),
            ("arity", "two".into()),
            ("value", Value::List(Vec::new())),
        ]);
        let errors = validate_component(&predicate, "predicate");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "isUserId: arity must be of number type");
        assert_eq!(errors[1].message, "isUserId: value must contain more than 1 items");
        assert_eq!(errors[1].violation, Violation::MinItems { expected: 1 });
    }

    #[test]
    fn test_array_item_types() {
        let predicate = record([
            ("id", "isUserId".into()),
            ("arity", 2_i64.into()),
            ("value", vec!["user1 userId1"].into()),
        ]);
        let errors = validate_component(&predicate, "predicate");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].violation, Violation::ItemType { expected: FieldType::Array });
        assert_eq!(errors[0].message, "isUserId: value items must be of array type");

        let actor = record([
            ("id", "eve".into()),
            ("atLocations", Value::List(vec![Value::Integer(3)])),
        ]);
        let errors = validate_component(&actor, "actor");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "eve must be located somewhere");
    }

    #[test]
    fn test_valid_location() {
        let location = record([("id", "hall".into()), ("atLocations", vec!["lobby"].into())]);
        assert!(validate_component(&location, "location").is_empty());
    }

    #[test]
    fn test_unknown_type_is_explicit() {
        let errors = validate_component(&Record::new(), "hamburger");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].violation, Violation::UnknownType);
    }

    #[test]
    fn test_validate_model_orders_by_collection() {
        let model = Model::new()
            .add_location(record([("type", "room".into())]))
            .add_actor(record([("id", "eve".into())]));
        let messages: Vec<_> = validate_model(&model).into_iter().map(|e| e.message).collect();
        assert_eq!(
            messages,
            ["eve must be located somewhere", "(unnamed location): id is required"]
        );
    }
}

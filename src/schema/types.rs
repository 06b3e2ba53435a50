//! Schema type definitions
//!
//! Wire format, one JSON object per endpoint:
//!
//! ```json
//! {
//!     "ledger_id": { "required": true, "data_type": "str" },
//!     "amount--value": { "required": false, "data_type": ["int", "float"] },
//!     "kind": { "required": true, "data_type": "enum", "options": ["charge", "refund"] }
//! }
//! ```
//!
//! Supported type names:
//! - str, int, float, bool, None, list, dict
//! - enum (requires a non-empty `options` list)
//!
//! Type names are resolved once, at load time, into [`FieldKind`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// Separator between nested segments of a field path (`a--b` is `a.b`)
pub const PATH_SEPARATOR: &str = "--";

static NULL: Value = Value::Null;

/// Runtime kind of a JSON value, named the way schema files name them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
    Null,
    List,
    Dict,
}

impl Primitive {
    /// Returns the type name used in schema files and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Null => "None",
            Primitive::List => "list",
            Primitive::Dict => "dict",
        }
    }

    /// Parses a schema type name. `enum` is not a primitive.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Primitive::Str),
            "int" => Some(Primitive::Int),
            "float" => Some(Primitive::Float),
            "bool" => Some(Primitive::Bool),
            "None" => Some(Primitive::Null),
            "list" => Some(Primitive::List),
            "dict" => Some(Primitive::Dict),
            _ => None,
        }
    }

    /// Returns the kind of a JSON value. Integral numbers are `int`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Primitive::Null,
            Value::Bool(_) => Primitive::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Primitive::Int
                } else {
                    Primitive::Float
                }
            }
            Value::String(_) => Primitive::Str,
            Value::Array(_) => Primitive::List,
            Value::Object(_) => Primitive::Dict,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Whether a field must carry a non-null value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// What a field's value is checked against
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Value kind must be one of these (declaration order, no duplicates)
    Primitive(Vec<Primitive>),
    /// Value must equal one of these options
    Enum { options: Vec<Value> },
}

/// One validated schema entry
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    /// Field key exactly as declared, used in error messages
    pub name: String,
    /// Nested segments of `name`
    pub path: Vec<String>,
    pub presence: Presence,
    pub kind: FieldKind,
}

impl FieldRule {
    /// Create a rule, splitting `name` on [`PATH_SEPARATOR`]
    pub fn new(name: impl Into<String>, presence: Presence, kind: FieldKind) -> Self {
        let name = name.into();
        let path = name.split(PATH_SEPARATOR).map(str::to_string).collect();
        Self {
            name,
            path,
            presence,
            kind,
        }
    }

    /// Create a required primitive rule
    pub fn required(name: impl Into<String>, types: &[Primitive]) -> Self {
        Self::new(name, Presence::Required, FieldKind::Primitive(types.to_vec()))
    }

    /// Create an optional primitive rule
    pub fn optional(name: impl Into<String>, types: &[Primitive]) -> Self {
        Self::new(name, Presence::Optional, FieldKind::Primitive(types.to_vec()))
    }

    /// Create an enum rule
    pub fn one_of(name: impl Into<String>, presence: Presence, options: Vec<Value>) -> Self {
        Self::new(name, presence, FieldKind::Enum { options })
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    /// Primitive kinds this rule accepts: the declared ones, plus `None`
    /// for optional fields. Empty for enum rules.
    pub fn accepted(&self) -> Vec<Primitive> {
        let FieldKind::Primitive(declared) = &self.kind else {
            return Vec::new();
        };
        let mut accepted = declared.clone();
        if !self.is_required() && !accepted.contains(&Primitive::Null) {
            accepted.push(Primitive::Null);
        }
        accepted
    }

    /// Walks the input along this rule's path. A missing or non-object
    /// intermediate segment resolves to null.
    pub fn resolve<'v>(&self, input: &'v Value) -> &'v Value {
        let mut current = input;
        for segment in &self.path {
            current = match current {
                Value::Object(map) => map.get(segment).unwrap_or(&NULL),
                _ => &NULL,
            };
        }
        current
    }
}

/// Named, ordered set of field rules
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Schema name (file stem, e.g. `add_card`)
    pub name: String,
    /// Rules in declaration order
    pub fields: Vec<FieldRule>,
}

impl Schema {
    /// Create a schema from already-typed rules
    pub fn new(name: impl Into<String>, fields: Vec<FieldRule>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Parse a schema from its JSON wire form
    pub fn from_json(name: impl Into<String>, content: &str) -> SchemaResult<Self> {
        let name = name.into();
        let value: Value = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(&name, format!("invalid JSON: {}", e)))?;
        Self::from_value(name, value)
    }

    /// Parse a schema from an already-decoded JSON object
    pub fn from_value(name: impl Into<String>, value: Value) -> SchemaResult<Self> {
        let name = name.into();
        let Value::Object(entries) = value else {
            return Err(SchemaError::malformed(&name, "schema must be a JSON object"));
        };

        let fields = entries
            .into_iter()
            .map(|(field, raw)| parse_rule(&name, field, raw))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self { name, fields })
    }

    /// Gets a rule by its declared key
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct RawRule {
    required: bool,
    data_type: RawTypes,
    #[serde(default)]
    options: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTypes {
    One(String),
    Many(Vec<String>),
}

impl RawTypes {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawTypes::One(name) => vec![name],
            RawTypes::Many(names) => names,
        }
    }
}

fn parse_rule(schema: &str, field: String, raw: Value) -> SchemaResult<FieldRule> {
    let raw: RawRule = serde_json::from_value(raw)
        .map_err(|e| SchemaError::malformed(schema, format!("field '{}': {}", field, e)))?;

    let presence = if raw.required {
        Presence::Required
    } else {
        Presence::Optional
    };

    let names = raw.data_type.into_vec();
    if names.is_empty() {
        return Err(SchemaError::EmptyTypes {
            schema: schema.to_string(),
            field,
        });
    }

    // Other names next to `enum` (usually "None") do not widen an enum rule
    if names.iter().any(|n| n == "enum") {
        let options = raw.options.unwrap_or_default();
        if options.is_empty() {
            return Err(SchemaError::EmptyEnum {
                schema: schema.to_string(),
                field,
            });
        }
        for name in names.iter().filter(|n| n.as_str() != "enum") {
            check_type_name(schema, &field, name)?;
        }
        return Ok(FieldRule::one_of(field, presence, options));
    }

    let mut declared = Vec::with_capacity(names.len());
    for name in &names {
        let primitive = check_type_name(schema, &field, name)?;
        if !declared.contains(&primitive) {
            declared.push(primitive);
        }
    }

    Ok(FieldRule::new(field, presence, FieldKind::Primitive(declared)))
}

fn check_type_name(schema: &str, field: &str, name: &str) -> SchemaResult<Primitive> {
    Primitive::from_type_name(name).ok_or_else(|| SchemaError::UnknownType {
        schema: schema.to_string(),
        field: field.to_string(),
        type_name: name.to_string(),
    })
}

/// Renders a list for error messages: `[int, None]`
pub(crate) fn render_list<T: fmt::Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    format!("[{}]", inner.join(", "))
}

/// Keeps field order stable when a schema is rebuilt from a map
pub(crate) fn to_wire(schema: &Schema) -> Value {
    let mut out = Map::new();
    for rule in &schema.fields {
        let mut entry = Map::new();
        entry.insert("required".into(), Value::Bool(rule.is_required()));
        match &rule.kind {
            FieldKind::Primitive(types) => {
                let names = types
                    .iter()
                    .map(|t| Value::String(t.type_name().to_string()))
                    .collect();
                entry.insert("data_type".into(), Value::Array(names));
            }
            FieldKind::Enum { options } => {
                entry.insert("data_type".into(), Value::String("enum".into()));
                entry.insert("options".into(), Value::Array(options.clone()));
            }
        }
        out.insert(rule.name.clone(), Value::Object(entry));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_and_list_types() {
        let schema = Schema::from_value(
            "add_card",
            json!({
                "ledger_id": { "required": true, "data_type": "str" },
                "amount": { "required": false, "data_type": ["int", "float", "int"] }
            }),
        )
        .unwrap();

        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[0].name, "ledger_id");
        assert_eq!(
            schema.field("amount").unwrap().kind,
            FieldKind::Primitive(vec![Primitive::Int, Primitive::Float])
        );
    }

    #[test]
    fn test_nested_path_split() {
        let rule = FieldRule::required("amount--value", &[Primitive::Int]);
        assert_eq!(rule.path, vec!["amount", "value"]);
    }

    #[test]
    fn test_enum_requires_options() {
        let result = Schema::from_value(
            "refund",
            json!({ "kind": { "required": true, "data_type": "enum" } }),
        );
        assert!(matches!(result, Err(SchemaError::EmptyEnum { .. })));

        let result = Schema::from_value(
            "refund",
            json!({ "kind": { "required": true, "data_type": "enum", "options": [] } }),
        );
        assert!(matches!(result, Err(SchemaError::EmptyEnum { .. })));
    }

    #[test]
    fn test_enum_with_none_stays_enum() {
        let schema = Schema::from_value(
            "add_card",
            json!({
                "method": {
                    "required": false,
                    "data_type": ["enum", "None"],
                    "options": ["courier"]
                }
            }),
        )
        .unwrap();

        assert_eq!(
            schema.fields[0].kind,
            FieldKind::Enum {
                options: vec![json!("courier")]
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = Schema::from_value(
            "get_card",
            json!({ "card_id": { "required": true, "data_type": "string" } }),
        );
        match result {
            Err(SchemaError::UnknownType { type_name, .. }) => assert_eq!(type_name, "string"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_type_list_rejected() {
        let result = Schema::from_value(
            "get_card",
            json!({ "card_id": { "required": true, "data_type": [] } }),
        );
        assert!(matches!(result, Err(SchemaError::EmptyTypes { .. })));
    }

    #[test]
    fn test_accepted_adds_none_when_optional() {
        let rule = FieldRule::optional("flag", &[Primitive::Bool]);
        assert_eq!(rule.accepted(), vec![Primitive::Bool, Primitive::Null]);

        let rule = FieldRule::required("flag", &[Primitive::Bool]);
        assert_eq!(rule.accepted(), vec![Primitive::Bool]);
    }

    #[test]
    fn test_resolve_missing_intermediate_is_null() {
        let rule = FieldRule::required("a--b--c", &[Primitive::Int]);
        assert_eq!(rule.resolve(&json!({ "a": { "b": { "c": 7 } } })), &json!(7));
        assert!(rule.resolve(&json!({ "a": {} })).is_null());
        assert!(rule.resolve(&json!({ "a": "flat" })).is_null());
    }

    #[test]
    fn test_primitive_of_numbers() {
        assert_eq!(Primitive::of(&json!(42)), Primitive::Int);
        assert_eq!(Primitive::of(&json!(42.5)), Primitive::Float);
        assert_eq!(Primitive::of(&json!(true)), Primitive::Bool);
        assert_eq!(Primitive::of(&json!(null)), Primitive::Null);
    }

    #[test]
    fn test_wire_round_trip_keeps_order() {
        let schema = Schema::new(
            "s",
            vec![
                FieldRule::required("z", &[Primitive::Str]),
                FieldRule::one_of("a", Presence::Optional, vec![json!("x")]),
            ],
        );
        let parsed = Schema::from_value("s", to_wire(&schema)).unwrap();
        assert_eq!(parsed, schema);
    }
}

#![forbid(unsafe_code)]

//! Core domain types for schemabridge
//!
//! This module defines the description format: the data-only tree that
//! `compile` consumes and `extract` produces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type tags understood by the description format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Any,
    Alternatives,
    Array,
    Boolean,
    Binary,
    Date,
    Function,
    Link,
    Number,
    Object,
    String,
    Symbol,
}

impl SchemaType {
    /// Returns all type tags
    pub fn all() -> [SchemaType; 12] {
        [
            SchemaType::Any,
            SchemaType::Alternatives,
            SchemaType::Array,
            SchemaType::Boolean,
            SchemaType::Binary,
            SchemaType::Date,
            SchemaType::Function,
            SchemaType::Link,
            SchemaType::Number,
            SchemaType::Object,
            SchemaType::String,
            SchemaType::Symbol,
        ]
    }

    /// Returns the tag as it appears in descriptions
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Any => "any",
            SchemaType::Alternatives => "alternatives",
            SchemaType::Array => "array",
            SchemaType::Boolean => "boolean",
            SchemaType::Binary => "binary",
            SchemaType::Date => "date",
            SchemaType::Function => "function",
            SchemaType::Link => "link",
            SchemaType::Number => "number",
            SchemaType::Object => "object",
            SchemaType::String => "string",
            SchemaType::Symbol => "symbol",
        }
    }

    /// Whether size rules on this type compare the value itself rather than its length
    pub fn compares_by_value(&self) -> bool {
        matches!(self, SchemaType::Number | SchemaType::Date)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Presence requirement of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
    Forbidden,
}

impl Presence {
    /// Returns the directive name carrying this presence
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Required => "required",
            Presence::Optional => "optional",
            Presence::Forbidden => "forbidden",
        }
    }

    /// Parses a presence mode name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "required" => Some(Presence::Required),
            "optional" => Some(Presence::Optional),
            "forbidden" => Some(Presence::Forbidden),
            _ => None,
        }
    }
}

/// Comparison operator attached to size rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    GreaterOrEqual,
    LessOrEqual,
    Less,
    Greater,
    Equal,
}

impl Operator {
    /// Returns the operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Equal => "=",
        }
    }

    /// Returns the directive a size rule with this operator came from
    ///
    /// `Equal` has no dedicated directive and maps to `None`.
    pub fn directive(&self) -> Option<&'static str> {
        match self {
            Operator::GreaterOrEqual => Some("min"),
            Operator::LessOrEqual => Some("max"),
            Operator::Less => Some("less"),
            Operator::Greater => Some("greater"),
            Operator::Equal => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One node of the description format
///
/// Serialized as a single flat object: the structural `type` and `properties`
/// keys plus one key per directive, in description order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Type tag of the node
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    /// Directives in application order
    #[serde(flatten)]
    pub directives: IndexMap<String, Value>,

    /// Child descriptions, only meaningful when `schema_type` is `Object`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaDescription>>,
}

impl SchemaDescription {
    /// Creates a description with no directives
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            directives: IndexMap::new(),
            properties: None,
        }
    }

    /// Appends a directive, replacing an existing one with the same name in place
    pub fn with_directive(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.directives.insert(name.into(), value.into());
        self
    }

    /// Adds a child property
    pub fn with_property(mut self, name: impl Into<String>, child: SchemaDescription) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), child);
        self
    }

    /// Parses a description from a JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Renders the description as a JSON value
    pub fn to_value(&self) -> Value {
        // Every field is plain JSON data, so serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Returns the directive value for `name`, if present
    pub fn directive(&self, name: &str) -> Option<&Value> {
        self.directives.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_round_trip() {
        for ty in SchemaType::all() {
            let value = serde_json::to_value(ty).unwrap();
            assert_eq!(value, json!(ty.as_str()));
            let back: SchemaType = serde_json::from_value(value).unwrap();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = SchemaDescription::from_value(json!({"type": "tuple"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_description_keeps_directive_order() {
        let desc = SchemaDescription::from_value(json!({
            "type": "string",
            "trim": true,
            "default": "x",
            "strip": true
        }))
        .unwrap();

        let names: Vec<&str> = desc.directives.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["trim", "default", "strip"]);
    }

    #[test]
    fn test_structural_keys_are_not_directives() {
        let desc = SchemaDescription::from_value(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "unknown": false
        }))
        .unwrap();

        assert_eq!(desc.schema_type, SchemaType::Object);
        assert!(desc.directive("type").is_none());
        assert!(desc.directive("properties").is_none());
        assert_eq!(desc.directives.len(), 1);
        assert_eq!(desc.properties.unwrap().len(), 1);
    }

    #[test]
    fn test_builder_helpers() {
        let desc = SchemaDescription::new(SchemaType::Object)
            .with_directive("unknown", true)
            .with_property("a", SchemaDescription::new(SchemaType::Number));

        assert_eq!(
            desc.to_value(),
            json!({"type": "object", "unknown": true, "properties": {"a": {"type": "number"}}})
        );
    }

    #[test]
    fn test_presence_parse() {
        assert_eq!(Presence::parse("required"), Some(Presence::Required));
        assert_eq!(Presence::parse("optional"), Some(Presence::Optional));
        assert_eq!(Presence::parse("forbidden"), Some(Presence::Forbidden));
        assert_eq!(Presence::parse("maybe"), None);
    }

    #[test]
    fn test_operator_directives() {
        assert_eq!(Operator::GreaterOrEqual.directive(), Some("min"));
        assert_eq!(Operator::LessOrEqual.directive(), Some("max"));
        assert_eq!(Operator::Less.directive(), Some("less"));
        assert_eq!(Operator::Greater.directive(), Some("greater"));
        assert_eq!(Operator::Equal.directive(), None);
        assert_eq!(Operator::GreaterOrEqual.to_string(), ">=");
    }
}

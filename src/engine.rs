#![forbid(unsafe_code)]

//! Validation engine contract
//!
//! The compiler and the extractor are written only against the traits in
//! this module. A builder side (`Engine`, `Schema`) creates validators and
//! applies directives to them; an introspection side (`Introspect`) exposes
//! the state a built validator recorded.

pub mod memory;

use crate::codec::{Operand, Pattern, Reference};
use crate::functions::NamedFunction;
use crate::types::{Operator, Presence, SchemaType};
use indexmap::IndexMap;
use serde_json::Value;

/// One positional argument passed to `Schema::apply`
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<V> {
    /// Plain data
    Value(Value),
    /// Value resolved by the engine at validation time
    Reference(Reference),
    /// Compiled pattern
    Pattern(Pattern),
    /// Function resolved from the registry
    Function(NamedFunction),
    /// Nested validator
    Schema(Box<V>),
}

impl<V> Argument<V> {
    /// Lift a codec operand into an argument
    pub fn from_operand(operand: Operand) -> Self {
        match operand {
            Operand::Literal(value) => Argument::Value(value),
            Operand::Reference(reference) => Argument::Reference(reference),
        }
    }

    /// Short name of the argument kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Argument::Value(_) => "value",
            Argument::Reference(_) => "reference",
            Argument::Pattern(_) => "pattern",
            Argument::Function(_) => "function",
            Argument::Schema(_) => "schema",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the operand if the argument is a literal or a reference
    pub fn as_operand(&self) -> Option<Operand> {
        match self {
            Argument::Value(value) => Some(Operand::Literal(value.clone())),
            Argument::Reference(reference) => Some(Operand::Reference(reference.clone())),
            _ => None,
        }
    }
}

/// A validator under construction
///
/// `apply` consumes the validator and returns the next one, so engines are
/// free to build immutably or to mutate in place.
pub trait Schema: Sized {
    /// Error reported by the engine, surfaced to callers untranslated
    type Error: std::error::Error + Send + Sync + 'static;

    /// Apply one directive method with positional arguments
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the method is unknown, unsupported for
    /// this validator type, or given the wrong arguments.
    fn apply(self, method: &str, args: Vec<Argument<Self>>) -> Result<Self, Self::Error>;
}

/// Factory for fresh validators
pub trait Engine {
    type Schema: Schema;

    /// Create a validator for a non-object type
    fn base(
        &self,
        schema_type: SchemaType,
    ) -> Result<Self::Schema, <Self::Schema as Schema>::Error>;

    /// Create an object validator, optionally with a keyed child table
    fn object(
        &self,
        children: Option<IndexMap<String, Self::Schema>>,
    ) -> Result<Self::Schema, <Self::Schema as Schema>::Error>;
}

/// Flags recorded on a validator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flags {
    pub presence: Option<Presence>,
    pub default: Option<Operand>,
}

/// One recorded rule invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RuleInvocation<V> {
    /// Engine method the rule was recorded under
    pub method: String,
    /// Comparison operator of size rules
    pub operator: Option<Operator>,
    /// Named argument bag
    pub args: IndexMap<String, Argument<V>>,
}

impl<V> RuleInvocation<V> {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            operator: None,
            args: IndexMap::new(),
        }
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_arg(mut self, name: impl Into<String>, arg: Argument<V>) -> Self {
        self.args.insert(name.into(), arg);
        self
    }
}

/// Allowed or disallowed values: literals and references kept apart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    pub values: Vec<Value>,
    pub references: Vec<Reference>,
}

impl ValueSet {
    pub fn insert(&mut self, operand: Operand) {
        match operand {
            Operand::Literal(value) => {
                if !self.values.contains(&value) {
                    self.values.push(value);
                }
            }
            Operand::Reference(reference) => {
                if !self.references.contains(&reference) {
                    self.references.push(reference);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.references.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSets {
    pub valid: Option<ValueSet>,
    pub invalid: Option<ValueSet>,
}

/// A string replacement term
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub pattern: Pattern,
    pub replacement: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Terms {
    pub replacements: Vec<Replacement>,
}

/// Read-only view of a built validator
pub trait Introspect: Sized {
    fn type_tag(&self) -> SchemaType;

    fn flags(&self) -> &Flags;

    /// Rule invocations in application order
    fn rules(&self) -> &[RuleInvocation<Self>];

    fn value_sets(&self) -> &ValueSets;

    fn terms(&self) -> &Terms;

    /// Keyed children of an object validator
    fn children(&self) -> Option<&IndexMap<String, Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_reference;
    use serde_json::json;

    #[test]
    fn test_value_set_deduplicates() {
        let mut set = ValueSet::default();
        set.insert(Operand::Literal(json!(1)));
        set.insert(Operand::Literal(json!(1)));
        set.insert(Operand::Reference(parse_reference("a").unwrap()));
        set.insert(Operand::Reference(parse_reference("a").unwrap()));
        assert_eq!(set.values, vec![json!(1)]);
        assert_eq!(set.references.len(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_argument_operands() {
        let literal: Argument<()> = Argument::from_operand(Operand::Literal(json!("x")));
        assert_eq!(literal.kind(), "value");
        assert_eq!(literal.as_value(), Some(&json!("x")));

        let reference: Argument<()> =
            Argument::from_operand(Operand::Reference(parse_reference("$max").unwrap()));
        assert_eq!(reference.kind(), "reference");
        assert!(reference.as_value().is_none());
        assert!(matches!(reference.as_operand(), Some(Operand::Reference(_))));
    }

    #[test]
    fn test_rule_invocation_builder() {
        let rule: RuleInvocation<()> = RuleInvocation::new("compare")
            .with_operator(Operator::GreaterOrEqual)
            .with_arg("limit", Argument::Value(json!(5)));
        assert_eq!(rule.method, "compare");
        assert_eq!(rule.operator, Some(Operator::GreaterOrEqual));
        assert_eq!(rule.args.len(), 1);
    }
}

#![forbid(unsafe_code)]

//! Reference in-memory engine
//!
//! `MemoryEngine` builds validators that only record what was applied to
//! them: flags, rule invocations, value sets and replacement terms. It never
//! evaluates data. The recorded state is laid out the way `extract` expects
//! to read it.

use crate::engine::{
    Argument, Engine, Flags, Introspect, Replacement, RuleInvocation, Schema, Terms, ValueSet,
    ValueSets,
};
use crate::types::{Operator, Presence, SchemaType};
use indexmap::IndexMap;
use serde_json::Value;

/// Methods whose only argument is an options value
const OPTIONS_ONLY: &[&str] = &[
    "empty", "base64", "dataUri", "domain", "email", "guid", "hex", "ip", "normalize", "uri",
    "uuid", "schema", "sort",
];

const PEER_GROUPS: &[&str] = &["and", "nand", "or", "oxor", "xor"];

/// Methods taking their arguments positionally, recorded as one list
const SPREAD: &[&str] = &["items", "ordered", "try"];

/// Errors raised by the in-memory engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MemoryError {
    /// Wrong number of arguments
    #[error("'{method}' expects {expected} argument(s), got {actual}")]
    Arity {
        method: String,
        expected: &'static str,
        actual: usize,
    },

    /// Method cannot be applied to this validator type
    #[error("'{method}' is not supported on {schema_type} validators")]
    Unsupported {
        method: String,
        schema_type: SchemaType,
    },

    /// Argument has the wrong kind
    #[error("argument {index} of '{method}' must be {expected}, got {actual}")]
    ArgumentKind {
        method: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Engine producing `MemorySchema` validators
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngine;

impl MemoryEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for MemoryEngine {
    type Schema = MemorySchema;

    fn base(&self, schema_type: SchemaType) -> Result<MemorySchema, MemoryError> {
        Ok(MemorySchema::new(schema_type))
    }

    fn object(
        &self,
        children: Option<IndexMap<String, MemorySchema>>,
    ) -> Result<MemorySchema, MemoryError> {
        let mut schema = MemorySchema::new(SchemaType::Object);
        schema.children = children;
        Ok(schema)
    }
}

/// A validator that records every applied method
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySchema {
    schema_type: SchemaType,
    flags: Flags,
    rules: Vec<RuleInvocation<MemorySchema>>,
    value_sets: ValueSets,
    terms: Terms,
    children: Option<IndexMap<String, MemorySchema>>,
}

type Args = Vec<Argument<MemorySchema>>;

impl MemorySchema {
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            flags: Flags::default(),
            rules: Vec::new(),
            value_sets: ValueSets::default(),
            terms: Terms::default(),
            children: None,
        }
    }

    fn unsupported(&self, method: &str) -> MemoryError {
        MemoryError::Unsupported {
            method: method.to_string(),
            schema_type: self.schema_type,
        }
    }

    fn push(mut self, rule: RuleInvocation<MemorySchema>) -> Self {
        self.rules.push(rule);
        self
    }

    fn presence(
        mut self,
        method: &str,
        args: Args,
        presence: Option<Presence>,
    ) -> Result<Self, MemoryError> {
        let presence = match presence {
            Some(presence) => {
                arity(method, &args, 0, 0, "0")?;
                presence
            }
            None => {
                arity(method, &args, 1, 1, "1")?;
                args[0]
                    .as_value()
                    .and_then(Value::as_str)
                    .and_then(Presence::parse)
                    .ok_or_else(|| kind_error(method, 0, "a presence mode", &args[0]))?
            }
        };
        self.flags.presence = Some(presence);
        Ok(self)
    }

    fn default_value(mut self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 1, 1, "1")?;
        let operand = args[0]
            .as_operand()
            .ok_or_else(|| kind_error(method, 0, "a value or reference", &args[0]))?;
        self.flags.default = Some(operand);
        Ok(self)
    }

    fn value_set(mut self, method: &str, args: Args, valid: bool) -> Result<Self, MemoryError> {
        if args.is_empty() {
            return Err(arity_error(method, "at least 1", 0));
        }
        let set = if valid {
            self.value_sets.valid.get_or_insert_with(ValueSet::default)
        } else {
            self.value_sets.invalid.get_or_insert_with(ValueSet::default)
        };
        for (index, arg) in args.iter().enumerate() {
            let operand = arg
                .as_operand()
                .ok_or_else(|| kind_error(method, index, "a value or reference", arg))?;
            set.insert(operand);
        }
        Ok(self)
    }

    fn size_rule(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 1, 2, "1 to 2")?;
        let operator = match method {
            "min" => Operator::GreaterOrEqual,
            "max" => Operator::LessOrEqual,
            "less" => Operator::Less,
            "greater" => Operator::Greater,
            _ => Operator::Equal,
        };
        let engine_method = if self.schema_type.compares_by_value() {
            if operator == Operator::Equal {
                return Err(self.unsupported(method));
            }
            "compare"
        } else {
            "length"
        };
        let rule = limit_bag(method, "limit", args)?;
        let rule = RuleInvocation {
            method: engine_method.to_string(),
            ..rule
        };
        Ok(self.push(rule.with_operator(operator)))
    }

    fn sign(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        if self.schema_type != SchemaType::Number {
            return Err(self.unsupported(method));
        }
        let sign = match method {
            "positive" | "negative" => {
                arity(method, &args, 0, 0, "0")?;
                method.to_string()
            }
            _ => {
                arity(method, &args, 1, 1, "1")?;
                match args[0].as_value().and_then(Value::as_str) {
                    Some(sign @ ("positive" | "negative")) => sign.to_string(),
                    _ => return Err(kind_error(method, 0, "\"positive\" or \"negative\"", &args[0])),
                }
            }
        };
        Ok(self.push(RuleInvocation::new("sign").with_arg("sign", Argument::Value(Value::String(sign)))))
    }

    fn pattern(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        let is_object = self.schema_type == SchemaType::Object;
        if args.is_empty() {
            // Key-pattern construct of object validators
            if method == "regex" && is_object {
                return Ok(self.push(RuleInvocation::new("regex")));
            }
            return Err(self.unsupported(method));
        }
        arity(method, &args, 1, 3, "1 to 3")?;

        let mut args = args.into_iter().enumerate();
        let mut rule = match args.next() {
            Some((_, regex @ Argument::Pattern(_))) => RuleInvocation::new("pattern").with_arg("regex", regex),
            Some((index, other)) => return Err(kind_error(method, index, "a pattern", &other)),
            None => return Err(arity_error(method, "1 to 3", 0)),
        };

        for (index, arg) in args {
            match arg {
                Argument::Schema(_) if is_object && !rule.args.contains_key("schema") => {
                    rule = rule.with_arg("schema", arg);
                }
                Argument::Schema(_) => return Err(self.unsupported(method)),
                Argument::Value(Value::Object(_)) if !rule.args.contains_key("options") => {
                    rule = rule.with_arg("options", arg);
                }
                other => return Err(kind_error(method, index, "a schema or options", &other)),
            }
        }
        Ok(self.push(rule))
    }

    fn replace(mut self, method: &str, args: Args) -> Result<Self, MemoryError> {
        if self.schema_type != SchemaType::String {
            return Err(self.unsupported(method));
        }
        arity(method, &args, 2, 2, "2")?;
        let mut args = args.into_iter();
        let (Some(pattern), Some(replacement)) = (args.next(), args.next()) else {
            return Err(arity_error(method, "2", 0));
        };
        let Argument::Pattern(pattern) = pattern else {
            return Err(kind_error(method, 0, "a pattern", &pattern));
        };
        let Argument::Value(replacement) = replacement else {
            return Err(kind_error(method, 1, "a value", &replacement));
        };
        self.terms.replacements.push(Replacement { pattern, replacement });
        Ok(self)
    }

    fn peers(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        let mut values = Vec::with_capacity(args.len());
        let mut options = None;
        let count = args.len();
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Argument::Value(Value::Object(_)) if index + 1 == count && index > 0 => options = Some(arg),
                Argument::Value(Value::String(peer)) => values.push(Value::String(peer)),
                other => return Err(kind_error(method, index, "a peer name", &other)),
            }
        }
        if values.is_empty() {
            return Err(arity_error(method, "at least 1 peer", count));
        }

        let mut rule = RuleInvocation::new(method).with_arg("peers", Argument::Value(Value::Array(values)));
        if let Some(options) = options {
            rule = rule.with_arg("options", options);
        }
        Ok(self.push(rule))
    }

    fn unique(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 0, 2, "0 to 2")?;
        let mut rule = RuleInvocation::new(method);
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Argument::Function(_) if index == 0 => rule = rule.with_arg("comparator", arg),
                Argument::Value(Value::Object(_)) if !rule.args.contains_key("options") => {
                    rule = rule.with_arg("options", arg)
                }
                other => return Err(kind_error(method, index, "a comparator or options", &other)),
            }
        }
        Ok(self.push(rule))
    }

    fn rename(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 2, 3, "2 to 3")?;
        let mut rule = RuleInvocation::new(method);
        for (index, (name, arg)) in ["from", "to", "options"].into_iter().zip(args).enumerate() {
            let expected = match (&arg, name) {
                (Argument::Value(Value::String(_)), "from" | "to") => None,
                (Argument::Value(Value::Object(_)), "options") => None,
                (_, "options") => Some("an options object"),
                _ => Some("a key name"),
            };
            if let Some(expected) = expected {
                return Err(kind_error(method, index, expected, &arg));
            }
            rule = rule.with_arg(name, arg);
        }
        Ok(self.push(rule))
    }

    fn condition(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 2, 2, "2")?;
        let mut args = args.into_iter();
        let (Some(condition), Some(options)) = (args.next(), args.next()) else {
            return Err(arity_error(method, "2", 0));
        };
        if !matches!(condition, Argument::Reference(_) | Argument::Schema(_)) {
            return Err(kind_error(method, 0, "a reference or schema", &condition));
        }
        if !matches!(options, Argument::Value(Value::Object(_))) {
            return Err(kind_error(method, 1, "an options object", &options));
        }
        Ok(self.push(
            RuleInvocation::new(method)
                .with_arg("condition", condition)
                .with_arg("options", options),
        ))
    }

    fn assert(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 2, 3, "2 to 3")?;
        if !matches!(args[0], Argument::Reference(_)) {
            return Err(kind_error(method, 0, "a reference", &args[0]));
        }
        self.positional(method, &["subject", "schema", "message"], args)
    }

    fn with_without(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 2, 3, "2 to 3")?;
        self.positional(method, &["key", "peers", "options"], args)
    }

    fn example(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 1, 2, "1 to 2")?;
        self.positional(method, &["example", "options"], args)
    }

    fn external(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 1, 2, "1 to 2")?;
        if !matches!(args[0], Argument::Function(_)) {
            return Err(kind_error(method, 0, "a function", &args[0]));
        }
        self.positional(method, &["method", "description"], args)
    }

    fn fork(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 1, 2, "1 to 2")?;
        if let Some(adjuster) = args.get(1).filter(|arg| !matches!(arg, Argument::Function(_))) {
            return Err(kind_error(method, 1, "a function", adjuster));
        }
        self.positional(method, &["paths", "adjuster"], args)
    }

    fn positional(self, method: &str, names: &[&str], args: Args) -> Result<Self, MemoryError> {
        let mut rule = RuleInvocation::new(method);
        for (name, arg) in names.iter().zip(args) {
            rule = rule.with_arg(*name, arg);
        }
        Ok(self.push(rule))
    }

    fn options_only(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        arity(method, &args, 0, 1, "0 to 1")?;
        let mut rule = RuleInvocation::new(method);
        if let Some(options) = args.into_iter().next() {
            rule = rule.with_arg("options", options);
        }
        Ok(self.push(rule))
    }

    fn spread(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        let mut values = Vec::with_capacity(args.len());
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Argument::Value(value) => values.push(value),
                other => return Err(kind_error(method, index, "a value", &other)),
            }
        }
        let rule = RuleInvocation::new(method).with_arg(method, Argument::Value(Value::Array(values)));
        Ok(self.push(rule))
    }

    fn generic(self, method: &str, args: Args) -> Result<Self, MemoryError> {
        let mut rule = RuleInvocation::new(method);
        match args.len() {
            0 => {}
            1 => {
                if let Some(arg) = args.into_iter().next() {
                    rule = rule.with_arg(method, arg);
                }
            }
            _ => {
                let mut values = Vec::with_capacity(args.len());
                for (index, arg) in args.into_iter().enumerate() {
                    match arg {
                        Argument::Value(value) => values.push(value),
                        other => return Err(kind_error(method, index, "a value", &other)),
                    }
                }
                rule = rule.with_arg(method, Argument::Value(Value::Array(values)));
            }
        }
        Ok(self.push(rule))
    }
}

impl Schema for MemorySchema {
    type Error = MemoryError;

    fn apply(self, method: &str, args: Vec<Argument<Self>>) -> Result<Self, MemoryError> {
        match method {
            "required" | "exist" => self.presence(method, args, Some(Presence::Required)),
            "optional" => self.presence(method, args, Some(Presence::Optional)),
            "forbidden" => self.presence(method, args, Some(Presence::Forbidden)),
            "presence" => self.presence(method, args, None),
            "default" => self.default_value(method, args),
            "valid" | "allow" | "equal" => self.value_set(method, args, true),
            "invalid" | "disallow" | "not" => self.value_set(method, args, false),
            "min" | "max" | "less" | "greater" | "length" => self.size_rule(method, args),
            "multiple" => Ok(self.push(limit_bag(method, "base", args)?)),
            "precision" => Ok(self.push(limit_bag(method, "limit", args)?)),
            "positive" | "negative" | "sign" => self.sign(method, args),
            "pattern" | "regex" => self.pattern(method, args),
            "replace" => self.replace(method, args),
            "unique" => self.unique(method, args),
            "rename" => self.rename(method, args),
            "when" | "conditional" => self.condition(method, args),
            "assert" => self.assert(method, args),
            "with" | "without" => self.with_without(method, args),
            "example" => self.example(method, args),
            "external" => self.external(method, args),
            "fork" => self.fork(method, args),
            _ if PEER_GROUPS.contains(&method) => self.peers(method, args),
            _ if SPREAD.contains(&method) => self.spread(method, args),
            _ if OPTIONS_ONLY.contains(&method) => self.options_only(method, args),
            _ => self.generic(method, args),
        }
    }
}

impl Introspect for MemorySchema {
    fn type_tag(&self) -> SchemaType {
        self.schema_type
    }

    fn flags(&self) -> &Flags {
        &self.flags
    }

    fn rules(&self) -> &[RuleInvocation<Self>] {
        &self.rules
    }

    fn value_sets(&self) -> &ValueSets {
        &self.value_sets
    }

    fn terms(&self) -> &Terms {
        &self.terms
    }

    fn children(&self) -> Option<&IndexMap<String, Self>> {
        self.children.as_ref()
    }
}

/// Build a `{<key>: limit, options?}` bag from `(limit, options?)`
fn limit_bag(method: &str, key: &str, args: Args) -> Result<RuleInvocation<MemorySchema>, MemoryError> {
    arity(method, &args, 1, 2, "1 to 2")?;
    let mut rule = RuleInvocation::new(method);
    for (index, arg) in args.into_iter().enumerate() {
        match (index, arg) {
            (0, limit @ (Argument::Value(_) | Argument::Reference(_))) => rule = rule.with_arg(key, limit),
            (1, options @ Argument::Value(Value::Object(_))) => rule = rule.with_arg("options", options),
            (0, other) => return Err(kind_error(method, 0, "a value or reference", &other)),
            (index, other) => return Err(kind_error(method, index, "an options object", &other)),
        }
    }
    Ok(rule)
}

fn arity(
    method: &str,
    args: &[Argument<MemorySchema>],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), MemoryError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(arity_error(method, expected, args.len()))
    }
}

fn arity_error(method: &str, expected: &'static str, actual: usize) -> MemoryError {
    MemoryError::Arity {
        method: method.to_string(),
        expected,
        actual,
    }
}

fn kind_error(
    method: &str,
    index: usize,
    expected: &'static str,
    arg: &Argument<MemorySchema>,
) -> MemoryError {
    MemoryError::ArgumentKind {
        method: method.to_string(),
        index,
        expected,
        actual: arg.kind(),
    }
}

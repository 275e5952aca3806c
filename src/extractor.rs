#![forbid(unsafe_code)]

//! Reverse extractor: validator → description
//!
//! Reads a validator through `Introspect` and rebuilds a description that
//! compiles back to an equivalent validator for the reversible subset of the
//! grammar. Rules that cannot be expressed as data are skipped.

use crate::codec::{pattern_to_value, reference_to_value};
use crate::engine::{Argument, Introspect, RuleInvocation, ValueSet};
use crate::grammar::{self, Bespoke, Category, Coercion, OptionKey, Secondary};
use crate::types::{SchemaDescription, SchemaType};
use serde_json::{Map, Value};
use tracing::debug;

/// Argument keys flattened to their value when they are alone in the bag
const FLATTENED_KEYS: &[&str] = &["limit", "base", "peers"];

/// Rebuild a description from a validator
///
/// Directives are emitted in this order: `valid`/`invalid`, `default`, the
/// presence directive, one directive per rule invocation, `replace`, and
/// finally `properties` for object validators.
pub fn extract<V: Introspect>(validator: &V) -> SchemaDescription {
    let mut description = SchemaDescription::new(validator.type_tag());
    let directives = &mut description.directives;

    let sets = validator.value_sets();
    for (name, set) in [("valid", &sets.valid), ("invalid", &sets.invalid)] {
        if let Some(set) = set.as_ref().filter(|set| !set.is_empty()) {
            directives.insert(name.to_string(), value_set(set));
        }
    }

    let flags = validator.flags();
    if let Some(default) = &flags.default {
        directives.insert("default".to_string(), default.to_value());
    }
    if let Some(presence) = flags.presence {
        directives.insert(presence.as_str().to_string(), Value::Bool(true));
    }

    for rule in validator.rules() {
        if let Some((name, value)) = rule_directive(rule) {
            directives.insert(name, value);
        }
    }

    let replacements = &validator.terms().replacements;
    if !replacements.is_empty() {
        let entries = replacements
            .iter()
            .map(|r| {
                let mut entry = Map::new();
                entry.insert("find".to_string(), pattern_to_value(&r.pattern));
                entry.insert("replace".to_string(), r.replacement.clone());
                Value::Object(entry)
            })
            .collect();
        directives.insert("replace".to_string(), Value::Array(entries));
    }

    if validator.type_tag() == SchemaType::Object
        && let Some(children) = validator.children()
    {
        description.properties = Some(
            children
                .iter()
                .map(|(key, child)| (key.clone(), extract(child)))
                .collect(),
        );
    }

    description
}

fn value_set(set: &ValueSet) -> Value {
    let values = set
        .values
        .iter()
        .cloned()
        .chain(set.references.iter().map(reference_to_value))
        .collect();
    Value::Array(values)
}

/// Map one rule invocation to a directive name and value
fn rule_directive<V>(rule: &RuleInvocation<V>) -> Option<(String, Value)> {
    let method = rule.method.as_str();
    let name = match (method, rule.operator) {
        ("compare" | "length", Some(operator)) if operator.directive().is_some() => {
            operator.directive()?
        }
        ("compare", _) => {
            debug!(method, "comparison without a directive operator; skipping");
            return None;
        }
        ("sign", _) => {
            return match rule.args.get("sign").and_then(Argument::as_value) {
                Some(Value::String(sign)) if sign == "positive" || sign == "negative" => {
                    Some((sign.clone(), Value::Bool(true)))
                }
                _ => {
                    debug!("sign rule without a known sign; skipping");
                    None
                }
            };
        }
        (method, _) => method,
    };

    let Some(directive) = grammar::lookup(name) else {
        debug!(method, "no directive for rule; skipping");
        return None;
    };
    if !directive.reversible {
        debug!(directive = name, "write-only directive; skipping");
        return None;
    }

    let mut bag = Map::new();
    for (key, arg) in &rule.args {
        let Some(value) = render(arg) else {
            debug!(directive = name, argument = %key, kind = arg.kind(), "argument is not data; skipping rule");
            return None;
        };
        bag.insert(key.clone(), value);
    }

    let value = match directive.category {
        Category::OptionalConfig => bag.remove("options").unwrap_or(Value::Bool(true)),
        Category::Pattern => pattern_value(bag),
        Category::Bespoke(Bespoke::Rename)
        | Category::Unary(Coercion::Limit(_))
        | Category::OptionKeyed(OptionKey {
            secondary: Secondary::Options,
            ..
        }) => flatten(merge_options(bag), name, method),
        _ => flatten(bag, name, method),
    };
    Some((name.to_string(), value))
}

fn render<V>(arg: &Argument<V>) -> Option<Value> {
    match arg {
        Argument::Value(value) => Some(value.clone()),
        Argument::Reference(reference) => Some(reference_to_value(reference)),
        Argument::Pattern(pattern) => Some(pattern_to_value(pattern)),
        Argument::Function(_) | Argument::Schema(_) => None,
    }
}

/// Lift the keys of a nested `options` object into the bag itself
fn merge_options(mut bag: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(options)) = bag.remove("options") {
        for (key, value) in options {
            bag.entry(key).or_insert(value);
        }
    }
    bag
}

fn flatten(bag: Map<String, Value>, name: &str, method: &str) -> Value {
    if bag.is_empty() {
        return Value::Bool(true);
    }
    let single = bag.len() == 1
        && bag
            .keys()
            .all(|k| FLATTENED_KEYS.contains(&k.as_str()) || k == name || k == method);
    if single {
        return bag
            .into_iter()
            .next()
            .map_or(Value::Bool(true), |(_, value)| value);
    }
    Value::Object(bag)
}

fn pattern_value(mut bag: Map<String, Value>) -> Value {
    // Key-pattern construct of object validators has no arguments
    let Some(regex) = bag.remove("regex") else {
        return Value::Bool(true);
    };
    match bag.remove("options") {
        None => regex,
        Some(options) => {
            let mut record = match regex {
                Value::Object(record) => record,
                text => {
                    let mut record = Map::new();
                    record.insert("pattern".to_string(), text);
                    record
                }
            };
            record.insert("options".to_string(), options);
            Value::Object(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Operand, parse_pattern, parse_reference};
    use crate::engine::{Flags, Replacement, Terms, ValueSets};
    use crate::functions::FunctionRegistry;
    use crate::types::{Operator, Presence};
    use indexmap::IndexMap;
    use serde_json::json;

    /// Hand-built validator state, independent of any engine
    struct Recorded {
        schema_type: SchemaType,
        flags: Flags,
        rules: Vec<RuleInvocation<Recorded>>,
        value_sets: ValueSets,
        terms: Terms,
        children: Option<IndexMap<String, Recorded>>,
    }

    impl Recorded {
        fn new(schema_type: SchemaType) -> Self {
            Self {
                schema_type,
                flags: Flags::default(),
                rules: Vec::new(),
                value_sets: ValueSets::default(),
                terms: Terms::default(),
                children: None,
            }
        }

        fn rule(mut self, rule: RuleInvocation<Recorded>) -> Self {
            self.rules.push(rule);
            self
        }
    }

    impl Introspect for Recorded {
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

    fn value(v: Value) -> Argument<Recorded> {
        Argument::Value(v)
    }

    #[test]
    fn test_operator_normalization() {
        let validator = Recorded::new(SchemaType::String)
            .rule(RuleInvocation::new("length").with_operator(Operator::Less).with_arg("limit", value(json!(4))))
            .rule(RuleInvocation::new("length").with_operator(Operator::Greater).with_arg("limit", value(json!(1))))
            .rule(RuleInvocation::new("length").with_operator(Operator::Equal).with_arg("limit", value(json!(2))));

        let description = extract(&validator);
        assert_eq!(description.directive("less"), Some(&json!(4)));
        assert_eq!(description.directive("greater"), Some(&json!(1)));
        assert_eq!(description.directive("length"), Some(&json!(2)));
    }

    #[test]
    fn test_compare_without_operator_is_skipped() {
        let validator = Recorded::new(SchemaType::Number)
            .rule(RuleInvocation::new("compare").with_operator(Operator::Equal).with_arg("limit", value(json!(1))));
        assert!(extract(&validator).directives.is_empty());
    }

    #[test]
    fn test_sign_becomes_toggle() {
        let validator = Recorded::new(SchemaType::Number)
            .rule(RuleInvocation::new("sign").with_arg("sign", value(json!("positive"))));
        assert_eq!(extract(&validator).directive("positive"), Some(&json!(true)));
    }

    #[test]
    fn test_flags_and_value_sets() {
        let mut validator = Recorded::new(SchemaType::Any);
        validator.flags = Flags {
            presence: Some(Presence::Optional),
            default: Some(Operand::Reference(parse_reference("$fallback").unwrap())),
        };
        let mut valid = ValueSet::default();
        valid.insert(Operand::Literal(json!("a")));
        valid.insert(Operand::Reference(parse_reference("b").unwrap()));
        validator.value_sets.valid = Some(valid);

        let description = extract(&validator);
        let names: Vec<&str> = description.directives.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["valid", "default", "optional"]);
        assert_eq!(description.directive("valid"), Some(&json!(["a", {"$ref": "b"}])));
        assert_eq!(description.directive("default"), Some(&json!({"$ref": "$fallback"})));
    }

    #[test]
    fn test_write_only_and_function_rules_are_skipped() {
        let registry = FunctionRegistry::with_builtins();
        let comparator = registry.comparator("deep-equal").unwrap();
        let validator = Recorded::new(SchemaType::Object)
            .rule(RuleInvocation::new("with").with_arg("key", value(json!("a"))))
            .rule(RuleInvocation::new("unique").with_arg("comparator", Argument::Function(comparator)))
            .rule(RuleInvocation::new("mystery"));
        assert!(extract(&validator).directives.is_empty());
    }

    #[test]
    fn test_bag_shapes() {
        let validator = Recorded::new(SchemaType::Object)
            .rule(RuleInvocation::new("and").with_arg("peers", value(json!(["a", "b"]))))
            .rule(
                RuleInvocation::new("xor")
                    .with_arg("peers", value(json!(["c", "d"])))
                    .with_arg("options", value(json!({"separator": "/"}))),
            )
            .rule(
                RuleInvocation::new("rename")
                    .with_arg("from", value(json!("a")))
                    .with_arg("to", value(json!("b")))
                    .with_arg("options", value(json!({"alias": true}))),
            )
            .rule(RuleInvocation::new("unknown").with_arg("unknown", value(json!(false))))
            .rule(RuleInvocation::new("email").with_arg("options", value(json!({"tlds": false}))))
            .rule(RuleInvocation::new("uuid"));

        let description = extract(&validator);
        assert_eq!(description.directive("and"), Some(&json!(["a", "b"])));
        assert_eq!(
            description.directive("xor"),
            Some(&json!({"peers": ["c", "d"], "options": {"separator": "/"}}))
        );
        assert_eq!(
            description.directive("rename"),
            Some(&json!({"from": "a", "to": "b", "alias": true}))
        );
        assert_eq!(description.directive("unknown"), Some(&json!(false)));
        assert_eq!(description.directive("email"), Some(&json!({"tlds": false})));
        assert_eq!(description.directive("uuid"), Some(&json!(true)));
    }

    #[test]
    fn test_limit_with_options_merges() {
        let validator = Recorded::new(SchemaType::Array).rule(
            RuleInvocation::new("length")
                .with_operator(Operator::GreaterOrEqual)
                .with_arg("limit", Argument::Reference(parse_reference("count").unwrap()))
                .with_arg("options", value(json!({"message": "short"}))),
        );
        assert_eq!(
            extract(&validator).directive("min"),
            Some(&json!({"limit": {"$ref": "count"}, "message": "short"}))
        );
    }

    #[test]
    fn test_patterns_and_replacements() {
        let mut validator = Recorded::new(SchemaType::String)
            .rule(RuleInvocation::new("pattern").with_arg("regex", Argument::Pattern(parse_pattern("/^a/i").unwrap())));
        validator.terms.replacements.push(Replacement {
            pattern: parse_pattern("-").unwrap(),
            replacement: json!("_"),
        });

        let description = extract(&validator);
        assert_eq!(description.directive("pattern"), Some(&json!("/^a/i")));
        assert_eq!(
            description.directive("replace"),
            Some(&json!([{"find": "-", "replace": "_"}]))
        );

        let keyed = Recorded::new(SchemaType::Object).rule(RuleInvocation::new("regex"));
        assert_eq!(extract(&keyed).directive("regex"), Some(&json!(true)));

        let with_options = Recorded::new(SchemaType::String).rule(
            RuleInvocation::new("pattern")
                .with_arg("regex", Argument::Pattern(parse_pattern("x").unwrap()))
                .with_arg("options", value(json!({"invert": true}))),
        );
        assert_eq!(
            extract(&with_options).directive("pattern"),
            Some(&json!({"pattern": "x", "options": {"invert": true}}))
        );
    }

    #[test]
    fn test_children_only_for_objects() {
        let mut object = Recorded::new(SchemaType::Object);
        let mut children = IndexMap::new();
        children.insert("name".to_string(), Recorded::new(SchemaType::String));
        object.children = Some(children);

        let description = extract(&object);
        let properties = description.properties.unwrap();
        assert_eq!(properties["name"].schema_type, SchemaType::String);

        let mut array = Recorded::new(SchemaType::Array);
        array.children = Some(IndexMap::new());
        assert!(extract(&array).properties.is_none());
    }
}

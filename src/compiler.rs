#![forbid(unsafe_code)]

//! Forward compiler: description → validator
//!
//! Each directive is looked up in the grammar table and turned into one or
//! more engine applications according to its category. The accumulator is
//! rebound to the validator each application returns.

use crate::codec::{
    Operand, REF_KEY, Reference, pattern_from_value, pattern_to_value, reference_from_notation,
    reference_from_value,
};
use crate::engine::{Argument, Engine, Schema};
use crate::error::CompileError;
use crate::functions::FunctionRegistry;
use crate::grammar::{self, Bespoke, Category, Coercion, Directive, OptionKey, Secondary};
use crate::types::{SchemaDescription, SchemaType};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Compile a description into a validator built by `engine`
///
/// # Arguments
///
/// * `engine` - Factory for base and object validators
/// * `description` - The description to compile; never modified
/// * `functions` - Registry resolving comparator and transform names
///
/// # Errors
///
/// Returns `CompileError::UnknownDirective` for names outside the grammar
/// table, codec and function-resolution errors for malformed arguments, and
/// `CompileError::Engine` for anything the engine rejects.
pub fn compile<E: Engine>(
    engine: &E,
    description: &SchemaDescription,
    functions: &FunctionRegistry,
) -> Result<E::Schema, CompileError> {
    Compiler { engine, functions }.node(description)
}

/// One method call on the accumulator
struct Application<S> {
    method: &'static str,
    args: Vec<Argument<S>>,
}

type Applications<S> = Result<Vec<Application<S>>, CompileError>;

fn one<S>(method: &'static str, args: Vec<Argument<S>>) -> Applications<S> {
    Ok(vec![Application { method, args }])
}

fn engine_error<Err>(error: Err) -> CompileError
where
    Err: std::error::Error + Send + Sync + 'static,
{
    CompileError::Engine(Box::new(error))
}

struct Compiler<'a, E> {
    engine: &'a E,
    functions: &'a FunctionRegistry,
}

impl<E: Engine> Compiler<'_, E> {
    fn node(&self, description: &SchemaDescription) -> Result<E::Schema, CompileError> {
        // 1. Seed the accumulator
        let mut schema = match description.schema_type {
            SchemaType::Object => {
                let children = match &description.properties {
                    Some(properties) => {
                        let mut table = IndexMap::with_capacity(properties.len());
                        for (key, child) in properties {
                            table.insert(key.clone(), self.node(child)?);
                        }
                        Some(table)
                    }
                    None => None,
                };
                self.engine.object(children).map_err(engine_error)?
            }
            schema_type => {
                if description.properties.is_some() {
                    warn!(%schema_type, "ignoring 'properties' on a non-object description");
                }
                self.engine.base(schema_type).map_err(engine_error)?
            }
        };

        // 2. Apply directives in description order
        for (name, value) in &description.directives {
            let directive = grammar::lookup(name)
                .ok_or_else(|| CompileError::UnknownDirective(name.clone()))?;

            for Application { method, args } in
                self.transform(directive, value, description.schema_type)?
            {
                schema = schema.apply(method, args).map_err(engine_error)?;
            }
        }

        debug!(
            schema_type = %description.schema_type,
            directives = description.directives.len(),
            "compiled description node"
        );
        Ok(schema)
    }

    fn transform(
        &self,
        directive: &Directive,
        value: &Value,
        schema_type: SchemaType,
    ) -> Applications<E::Schema> {
        let name = directive.name;
        match directive.category {
            Category::Toggle => {
                if value != &Value::Bool(true) {
                    warn!(directive = name, %value, "toggle value is ignored; applying anyway");
                }
                one(name, Vec::new())
            }
            Category::OptionalConfig => self.optional_config(name, value),
            Category::Unary(coercion) => self.unary(name, coercion, value),
            Category::OptionKeyed(layout) => self.option_keyed(name, layout, value),
            Category::Spread => match value {
                Value::Array(items) => {
                    one(name, items.iter().cloned().map(Argument::Value).collect())
                }
                other => one(name, vec![Argument::Value(other.clone())]),
            },
            Category::PeerGroup => self.peer_group(name, value),
            Category::Pattern => self.pattern(name, value, schema_type),
            Category::Bespoke(Bespoke::Unique) => self.unique(name, value),
            Category::Bespoke(Bespoke::Rename) => self.rename(name, value),
            Category::Bespoke(Bespoke::Replace) => self.replace(name, value),
            Category::Bespoke(Bespoke::Assert) => {
                let fields = record_or_sequence(name, value, &["reference", "schema", "message"], 2)?;
                let mut args = vec![Argument::Reference(self.reference(fields[0])?)];
                args.extend(fields[1..].iter().map(|v| Argument::Value((*v).clone())));
                one(name, args)
            }
            Category::Bespoke(Bespoke::KeyPeers) => {
                let fields = record_or_sequence(name, value, &["key", "peers", "options"], 2)?;
                one(
                    name,
                    fields.into_iter().map(|v| Argument::Value(v.clone())).collect(),
                )
            }
            Category::Bespoke(Bespoke::Condition) => self.condition(name, value),
        }
    }

    fn optional_config(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        match value {
            Value::Bool(true) => one(name, Vec::new()),
            Value::Object(options) if name == "uri" && options.contains_key("scheme") => {
                let mut options = options.clone();
                if let Some(scheme) = options.get_mut("scheme") {
                    *scheme = canonical_patterns(scheme)?;
                }
                one(name, vec![Argument::Value(Value::Object(options))])
            }
            other => one(name, vec![Argument::Value(other.clone())]),
        }
    }

    fn unary(
        &self,
        name: &'static str,
        coercion: Coercion,
        value: &Value,
    ) -> Applications<E::Schema> {
        match coercion {
            Coercion::Literal => one(name, vec![Argument::Value(value.clone())]),
            Coercion::Operand => one(name, vec![self.operand(value)?]),
            Coercion::Limit(key) => match value {
                Value::Object(map) if !map.contains_key(REF_KEY) => {
                    let primary = map.get(key).ok_or_else(|| {
                        CompileError::invalid(
                            name,
                            format!("expected a value, a reference or an object with '{key}'"),
                        )
                    })?;
                    let mut args = vec![self.operand(primary)?];
                    let options = without_keys(map, &[key]);
                    if !options.is_empty() {
                        args.push(Argument::Value(Value::Object(options)));
                    }
                    one(name, args)
                }
                other => one(name, vec![self.operand(other)?]),
            },
            Coercion::Elements => match value {
                Value::Array(items) => {
                    let args = items
                        .iter()
                        .map(|item| self.operand(item))
                        .collect::<Result<Vec<_>, _>>()?;
                    one(name, args)
                }
                other => one(name, vec![self.operand(other)?]),
            },
        }
    }

    fn option_keyed(
        &self,
        name: &'static str,
        layout: OptionKey,
        value: &Value,
    ) -> Applications<E::Schema> {
        let (map, primary) = match value {
            Value::Object(map) => match map.get(layout.primary) {
                Some(primary) => (map, primary),
                None => return one(name, vec![self.primary(name, layout, value)?]),
            },
            bare => return one(name, vec![self.primary(name, layout, bare)?]),
        };

        let mut args = vec![self.primary(name, layout, primary)?];
        match layout.secondary {
            Secondary::Options => {
                let options = without_keys(map, &[layout.primary]);
                if !options.is_empty() {
                    args.push(Argument::Value(Value::Object(options)));
                }
            }
            Secondary::Key(key) | Secondary::FunctionKey(key) => {
                if let Some(extra) = map.keys().find(|k| *k != layout.primary && *k != key) {
                    return Err(CompileError::invalid(name, format!("unexpected key '{extra}'")));
                }
                if let Some(secondary) = map.get(key) {
                    args.push(match layout.secondary {
                        Secondary::FunctionKey(_) => self.transform_arg(name, secondary)?,
                        _ => Argument::Value(secondary.clone()),
                    });
                }
            }
        }
        one(name, args)
    }

    fn primary(
        &self,
        name: &str,
        layout: OptionKey,
        value: &Value,
    ) -> Result<Argument<E::Schema>, CompileError> {
        if layout.primary_function {
            self.transform_arg(name, value)
        } else {
            Ok(Argument::Value(value.clone()))
        }
    }

    fn peer_group(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        match value {
            Value::Array(peers) => one(name, peers.iter().cloned().map(Argument::Value).collect()),
            Value::String(_) => one(name, vec![Argument::Value(value.clone())]),
            Value::Object(map) => {
                if let Some(extra) = map.keys().find(|k| *k != "peers" && *k != "options") {
                    return Err(CompileError::invalid(name, format!("unexpected key '{extra}'")));
                }
                let mut args: Vec<Argument<E::Schema>> = match map.get("peers") {
                    Some(Value::Array(peers)) => peers.iter().cloned().map(Argument::Value).collect(),
                    Some(peer @ Value::String(_)) => vec![Argument::Value(peer.clone())],
                    _ => return Err(CompileError::invalid(name, "'peers' must be a list of keys")),
                };
                if let Some(options) = map.get("options") {
                    let options = expect_object(name, "options", options)?.clone();
            args.push(Argument::Value(Value::Object(options)));
                }
                one(name, args)
            }
            _ => Err(CompileError::invalid(name, "expected a list of peers or {peers, options}")),
        }
    }

    fn pattern(
        &self,
        name: &'static str,
        value: &Value,
        schema_type: SchemaType,
    ) -> Applications<E::Schema> {
        if value == &Value::Bool(true) || is_object_marker(value) {
            return one("regex", Vec::new());
        }

        match value {
            Value::String(_) => one(name, vec![Argument::Pattern(pattern_from_value(value)?)]),
            Value::Object(map) => {
                let mut record = Map::new();
                let mut schema = None;
                let mut options = None;
                for (key, field) in map {
                    match key.as_str() {
                        "schema" => schema = Some(field),
                        "options" => options = Some(field),
                        _ => {
                            record.insert(key.clone(), field.clone());
                        }
                    }
                }

                let mut args = vec![Argument::Pattern(pattern_from_value(&Value::Object(record))?)];
                if let Some(schema) = schema {
                    if schema_type != SchemaType::Object {
                        return Err(CompileError::invalid(
                            name,
                            "a value schema is only allowed on object validators",
                        ));
                    }
                    args.push(Argument::Schema(Box::new(self.nested(name, schema)?)));
                }
                if let Some(options) = options {
                    let options = expect_object(name, "options", options)?.clone();
            args.push(Argument::Value(Value::Object(options)));
                }
                one(name, args)
            }
            _ => Err(CompileError::invalid(name, "expected a pattern")),
        }
    }

    fn unique(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        let map = match value {
            Value::Bool(true) => return one(name, Vec::new()),
            Value::Object(map) => map,
            _ => {
                return Err(CompileError::invalid(name, "expected true or {comparator, options}"));
            }
        };
        if let Some(extra) = map.keys().find(|k| *k != "comparator" && *k != "options") {
            return Err(CompileError::invalid(name, format!("unexpected key '{extra}'")));
        }

        let mut args = Vec::new();
        if let Some(comparator) = map.get("comparator") {
            let function = self.functions.comparator(function_name(name, comparator)?)?;
            args.push(Argument::Function(function));
        }
        if let Some(options) = map.get("options") {
            let options = expect_object(name, "options", options)?.clone();
            args.push(Argument::Value(Value::Object(options)));
        }
        one(name, args)
    }

    fn rename(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        let map = expect_object(name, "value", value)?;
        let mut args = Vec::with_capacity(3);
        for key in ["from", "to"] {
            match map.get(key) {
                Some(field @ Value::String(_)) => args.push(Argument::Value(field.clone())),
                Some(_) => {
                    return Err(CompileError::invalid(name, format!("'{key}' must be a string")));
                }
                None => return Err(CompileError::invalid(name, format!("missing '{key}'"))),
            }
        }
        let options = without_keys(map, &["from", "to"]);
        if !options.is_empty() {
            args.push(Argument::Value(Value::Object(options)));
        }
        one(name, args)
    }

    fn replace(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        let entries: Vec<&Value> = match value {
            Value::Array(entries) => entries.iter().collect(),
            entry => vec![entry],
        };

        entries
            .into_iter()
            .map(|entry| {
                let map = expect_object(name, "entry", entry)?;
                if let Some(extra) = map.keys().find(|k| *k != "find" && *k != "replace") {
                    return Err(CompileError::invalid(name, format!("unexpected key '{extra}'")));
                }
                let (Some(find), Some(replacement)) = (map.get("find"), map.get("replace")) else {
                    return Err(CompileError::invalid(name, "each entry needs 'find' and 'replace'"));
                };
                Ok(Application {
                    method: name,
                    args: vec![
                        Argument::Pattern(pattern_from_value(find)?),
                        Argument::Value(replacement.clone()),
                    ],
                })
            })
            .collect()
    }

    fn condition(&self, name: &'static str, value: &Value) -> Applications<E::Schema> {
        let map = expect_object(name, "value", value)?;
        let condition = match (map.get("reference"), map.get("schema")) {
            (Some(reference), None) => Argument::Reference(self.reference(reference)?),
            (None, Some(schema)) => Argument::Schema(Box::new(self.nested(name, schema)?)),
            (Some(_), Some(_)) => {
                return Err(CompileError::invalid(
                    name,
                    "'reference' and 'schema' are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(CompileError::invalid(name, "requires 'reference' or 'schema'"));
            }
        };
        // Branches are forwarded as a fresh object; the caller's map is untouched
        let branches = without_keys(map, &["reference", "schema"]);
        one(name, vec![condition, Argument::Value(Value::Object(branches))])
    }

    fn operand(&self, value: &Value) -> Result<Argument<E::Schema>, CompileError> {
        match reference_from_value(value)? {
            Operand::Reference(reference) => Ok(Argument::Reference(self.bind_adjust(reference)?)),
            literal => Ok(Argument::from_operand(literal)),
        }
    }

    fn reference(&self, value: &Value) -> Result<Reference, CompileError> {
        self.bind_adjust(reference_from_notation(value)?)
    }

    /// Resolve the adjust name so the engine receives the transform itself
    fn bind_adjust(&self, reference: Reference) -> Result<Reference, CompileError> {
        let Some(adjust) = reference.adjust() else {
            return Ok(reference);
        };
        let adjuster = self.functions.transform(adjust)?;
        Ok(reference.with_adjuster(adjuster))
    }

    fn transform_arg(&self, name: &str, value: &Value) -> Result<Argument<E::Schema>, CompileError> {
        let function = self.functions.transform(function_name(name, value)?)?;
        Ok(Argument::Function(function))
    }

    fn nested(&self, name: &str, value: &Value) -> Result<E::Schema, CompileError> {
        let description = SchemaDescription::from_value(value.clone())
            .map_err(|e| CompileError::InvalidDescription(format!("in '{name}': {e}")))?;
        self.node(&description)
    }
}

/// Canonicalize one pattern or a list of patterns
fn canonical_patterns(value: &Value) -> Result<Value, CompileError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| Ok(pattern_to_value(&pattern_from_value(item)?)))
            .collect::<Result<Vec<_>, CompileError>>()
            .map(Value::Array),
        single => Ok(pattern_to_value(&pattern_from_value(single)?)),
    }
}

fn is_object_marker(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.get("type") == Some(&Value::from("object")))
}

fn without_keys(map: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn expect_object<'v>(
    directive: &str,
    what: &str,
    value: &'v Value,
) -> Result<&'v Map<String, Value>, CompileError> {
    value
        .as_object()
        .ok_or_else(|| CompileError::invalid(directive, format!("{what} must be an object")))
}

fn function_name<'v>(directive: &str, value: &'v Value) -> Result<&'v str, CompileError> {
    value
        .as_str()
        .ok_or_else(|| CompileError::invalid(directive, "expected a function name"))
}

/// Read `{k1, k2, ...}` or `[v1, v2, ...]` into values ordered by `keys`
///
/// The first `required` keys must be present; the rest are optional and
/// trailing.
fn record_or_sequence<'v>(
    directive: &str,
    value: &'v Value,
    keys: &[&str],
    required: usize,
) -> Result<Vec<&'v Value>, CompileError> {
    match value {
        Value::Array(items) => {
            if items.len() < required || items.len() > keys.len() {
                return Err(CompileError::invalid(
                    directive,
                    format!("expected {required} to {} elements", keys.len()),
                ));
            }
            Ok(items.iter().collect())
        }
        Value::Object(map) => {
            if let Some(extra) = map.keys().find(|k| !keys.contains(&k.as_str())) {
                return Err(CompileError::invalid(directive, format!("unexpected key '{extra}'")));
            }
            let mut fields = Vec::with_capacity(keys.len());
            for (index, key) in keys.iter().enumerate() {
                match map.get(*key) {
                    Some(field) => fields.push(field),
                    None if index < required => {
                        return Err(CompileError::invalid(directive, format!("missing '{key}'")));
                    }
                    None => break,
                }
            }
            Ok(fields)
        }
        _ => Err(CompileError::invalid(
            directive,
            format!("expected an object with {} or a sequence", keys.join(", ")),
        )),
    }
}

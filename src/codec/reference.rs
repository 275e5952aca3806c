#![forbid(unsafe_code)]

//! Reference notation
//!
//! A reference points at another value that is resolved at validation time.
//! In descriptions it is written as `{"$ref": "<notation>"}` where the
//! notation selects a target and a dotted path:
//!
//! - `a.b`: sibling path (ancestor 1)
//! - `.a`: the value itself (ancestor 0)
//! - `..a`, `...a`: one more ancestor level per leading separator
//! - `/a.b`: root document
//! - `$a.b`: validation context
//! - `#a`: local value

use crate::error::CodecError;
use crate::functions::NamedFunction;
use serde_json::{Map, Value};
use std::fmt;

/// Key marking a reference object in descriptions
pub const REF_KEY: &str = "$ref";

const SEPARATOR: char = '.';
const ROOT_PREFIX: char = '/';
const CONTEXT_PREFIX: char = '$';
const LOCAL_PREFIX: char = '#';

/// Where a reference starts resolving from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefTarget {
    /// N levels up from the value holding the rule (0 is the value itself)
    Ancestor(u32),
    /// The root document
    Root,
    /// The validation context
    Context,
    /// Rule-local values
    Local,
}

/// A symbolic pointer to another value
///
/// Equality compares the notation only; a bound adjust transform is carried
/// along but is determined by its name.
#[derive(Debug, Clone)]
pub struct Reference {
    target: RefTarget,
    path: Vec<String>,
    in_reference: bool,
    adjust: Option<String>,
    adjuster: Option<NamedFunction>,
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.path == other.path
            && self.in_reference == other.in_reference
            && self.adjust == other.adjust
    }
}

impl Reference {
    /// Creates a reference with no modifiers
    pub fn new(target: RefTarget, path: Vec<String>) -> Self {
        Self {
            target,
            path,
            in_reference: false,
            adjust: None,
            adjuster: None,
        }
    }

    /// Marks the reference as an "in" reference (the target holds a list of allowed values)
    pub fn with_in(mut self, in_reference: bool) -> Self {
        self.in_reference = in_reference;
        self
    }

    /// Attaches the name of a transform applied to the resolved value
    pub fn with_adjust(mut self, adjust: impl Into<String>) -> Self {
        self.adjust = Some(adjust.into());
        self
    }

    /// Binds the transform the adjust name resolved to
    pub fn with_adjuster(mut self, adjuster: NamedFunction) -> Self {
        self.adjust = Some(adjuster.name().to_string());
        self.adjuster = Some(adjuster);
        self
    }

    pub fn target(&self) -> RefTarget {
        self.target
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_in(&self) -> bool {
        self.in_reference
    }

    /// Name of the adjust transform, if any
    pub fn adjust(&self) -> Option<&str> {
        self.adjust.as_deref()
    }

    /// The bound adjust transform, once resolved against a registry
    pub fn adjuster(&self) -> Option<&NamedFunction> {
        self.adjuster.as_ref()
    }

    fn bare_sibling(&self) -> bool {
        self.path.first().is_some_and(|first| !starts_with_prefix(first))
    }

    /// Renders the reference back to its notation
    pub fn to_text(&self) -> String {
        let joined = self.path.join(&SEPARATOR.to_string());
        match self.target {
            RefTarget::Root => format!("{ROOT_PREFIX}{joined}"),
            RefTarget::Context => format!("{CONTEXT_PREFIX}{joined}"),
            RefTarget::Local => format!("{LOCAL_PREFIX}{joined}"),
            RefTarget::Ancestor(1) if self.bare_sibling() => joined,
            RefTarget::Ancestor(level) => {
                let dots: String = std::iter::repeat_n(SEPARATOR, level as usize + 1).collect();
                format!("{dots}{joined}")
            }
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// A directive argument that may be either a literal or a reference
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Reference(Reference),
}

impl Operand {
    /// Renders the operand in description form
    pub fn to_value(&self) -> Value {
        match self {
            Operand::Literal(value) => value.clone(),
            Operand::Reference(reference) => reference_to_value(reference),
        }
    }
}

/// A bare path starting with a prefix character would read back as another target
fn starts_with_prefix(segment: &str) -> bool {
    segment.starts_with([ROOT_PREFIX, CONTEXT_PREFIX, LOCAL_PREFIX])
}

/// Parse reference notation text
///
/// # Errors
///
/// Returns `CodecError::MalformedReference` if the text is empty or contains
/// an empty path segment.
pub fn parse_reference(text: &str) -> Result<Reference, CodecError> {
    if text.is_empty() {
        return Err(CodecError::MalformedReference(
            "reference notation is empty".to_string(),
        ));
    }

    let (target, rest) = match text.chars().next() {
        Some(ROOT_PREFIX) => (RefTarget::Root, &text[1..]),
        Some(CONTEXT_PREFIX) => (RefTarget::Context, &text[1..]),
        Some(LOCAL_PREFIX) => (RefTarget::Local, &text[1..]),
        _ => {
            let dots = text.chars().take_while(|&c| c == SEPARATOR).count();
            let level = if dots == 0 { 1 } else { dots as u32 - 1 };
            (RefTarget::Ancestor(level), &text[dots..])
        }
    };

    if rest.is_empty() {
        // A bare prefix names the target itself; context and local need a key
        return match target {
            RefTarget::Context | RefTarget::Local => Err(CodecError::MalformedReference(
                format!("'{text}' has no key after its prefix"),
            )),
            _ => Ok(Reference::new(target, Vec::new())),
        };
    }

    let path: Vec<String> = rest.split(SEPARATOR).map(str::to_string).collect();
    if path.iter().any(String::is_empty) {
        return Err(CodecError::MalformedReference(format!(
            "'{text}' contains an empty path segment"
        )));
    }

    Ok(Reference::new(target, path))
}

/// Read a possible reference out of a description value
///
/// Objects carrying a `$ref` key become references; every other value passes
/// through unchanged as a literal.
///
/// # Errors
///
/// Returns `CodecError::MalformedReference` if the `$ref` object is malformed.
pub fn reference_from_value(value: &Value) -> Result<Operand, CodecError> {
    match value {
        Value::Object(map) if map.contains_key(REF_KEY) => {
            reference_from_object(map).map(Operand::Reference)
        }
        other => Ok(Operand::Literal(other.clone())),
    }
}

/// Read a value that must denote a reference, as notation text or a `$ref` object
///
/// # Errors
///
/// Returns `CodecError::MalformedReference` for any other value.
pub fn reference_from_notation(value: &Value) -> Result<Reference, CodecError> {
    match value {
        Value::String(text) => parse_reference(text),
        Value::Object(map) if map.contains_key(REF_KEY) => reference_from_object(map),
        other => Err(CodecError::MalformedReference(format!(
            "expected reference notation, got {other}"
        ))),
    }
}

/// Render a reference in description form
pub fn reference_to_value(reference: &Reference) -> Value {
    let mut map = Map::new();
    map.insert(REF_KEY.to_string(), Value::String(reference.to_text()));
    if reference.in_reference {
        map.insert("in".to_string(), Value::Bool(true));
    }
    if let Some(adjust) = &reference.adjust {
        map.insert("adjust".to_string(), Value::String(adjust.clone()));
    }
    Value::Object(map)
}

fn reference_from_object(map: &Map<String, Value>) -> Result<Reference, CodecError> {
    let mut reference = match map.get(REF_KEY) {
        Some(Value::String(text)) => parse_reference(text)?,
        Some(other) => {
            return Err(CodecError::MalformedReference(format!(
                "'{REF_KEY}' must be a string, got {other}"
            )));
        }
        None => {
            return Err(CodecError::MalformedReference(format!(
                "missing '{REF_KEY}' key"
            )));
        }
    };

    for (key, value) in map {
        match (key.as_str(), value) {
            (REF_KEY, _) => {}
            ("in", Value::Bool(flag)) => reference.in_reference = *flag,
            ("adjust", Value::String(name)) if !name.is_empty() => {
                reference.adjust = Some(name.clone())
            }
            (other, _) => {
                return Err(CodecError::MalformedReference(format!(
                    "unsupported reference option '{other}'"
                )));
            }
        }
    }

    Ok(reference)
}

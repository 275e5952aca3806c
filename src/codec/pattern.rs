#![forbid(unsafe_code)]

//! Pattern notation
//!
//! Patterns are written either as a plain source string (`^[a-z]+$`), as a
//! literal with flags (`/^[a-z]+$/i`), or as a record
//! `{"pattern": ..., "flags"?: ..., "name"?: ..., "invert"?: ...}`.

use crate::error::CodecError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Flags with a matching effect, applied as inline regex flags
const INLINE_FLAGS: &[char] = &['i', 'm', 's', 'x'];

/// Flags accepted for fidelity with literal notation but without matching effect
const INERT_FLAGS: &[char] = &['g', 'u', 'y'];

/// A compiled pattern together with its notation
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: BTreeSet<char>,
    name: Option<String>,
    invert: bool,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern from its source and flag characters
    ///
    /// # Errors
    ///
    /// Returns `CodecError::MalformedPattern` on unknown or repeated flags or
    /// when the source is not a valid regular expression.
    pub fn new(source: &str, flags: &str) -> Result<Self, CodecError> {
        let mut set = BTreeSet::new();
        for flag in flags.chars() {
            if !INLINE_FLAGS.contains(&flag) && !INERT_FLAGS.contains(&flag) {
                return Err(CodecError::MalformedPattern(format!(
                    "unsupported flag '{flag}' in /{source}/{flags}"
                )));
            }
            if !set.insert(flag) {
                return Err(CodecError::MalformedPattern(format!(
                    "repeated flag '{flag}' in /{source}/{flags}"
                )));
            }
        }
        Self::compile(source.to_string(), set)
    }

    fn compile(source: String, flags: BTreeSet<char>) -> Result<Self, CodecError> {
        let inline: String = flags
            .iter()
            .filter(|flag| INLINE_FLAGS.contains(flag))
            .collect();
        let effective = if inline.is_empty() {
            source.clone()
        } else {
            format!("(?{inline}){source}")
        };

        let regex = Regex::new(&effective).map_err(|e| {
            CodecError::MalformedPattern(format!("failed to compile '{source}': {e}"))
        })?;

        Ok(Self {
            source,
            flags,
            name: None,
            invert: false,
            regex,
        })
    }

    /// Attaches a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Inverts the match: the pattern then rejects values it matches
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flag characters in canonical (sorted) order
    pub fn flags(&self) -> String {
        self.flags.iter().collect()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether `text` passes the pattern, honoring inversion
    pub fn accepts(&self, text: &str) -> bool {
        self.regex.is_match(text) != self.invert
    }

    /// Renders the canonical text form
    ///
    /// Flagless patterns render as their bare source unless the source itself
    /// would read back as a literal, in which case it is wrapped in delimiters.
    pub fn to_text(&self) -> String {
        if self.flags.is_empty() && split_literal(&self.source).is_none() {
            self.source.clone()
        } else {
            format!("/{}/{}", self.source, self.flags())
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.flags == other.flags
            && self.name == other.name
            && self.invert == other.invert
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Split `/source/flags` literal notation, if `text` uses it
fn split_literal(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (source, flags) = (&body[..close], &body[close + 1..]);
    let all_flags = flags
        .chars()
        .all(|c| INLINE_FLAGS.contains(&c) || INERT_FLAGS.contains(&c));
    all_flags.then_some((source, flags))
}

/// Parse a pattern from text in plain or literal notation
///
/// # Errors
///
/// Returns `CodecError::MalformedPattern` if the pattern does not compile.
pub fn parse_pattern(text: &str) -> Result<Pattern, CodecError> {
    match split_literal(text) {
        Some((source, flags)) => Pattern::new(source, flags),
        None => Pattern::new(text, ""),
    }
}

/// Build a pattern from a description value: a string or a pattern record
///
/// # Errors
///
/// Returns `CodecError::MalformedPattern` for any other value, unknown record
/// keys, or a pattern that does not compile.
pub fn pattern_from_value(value: &Value) -> Result<Pattern, CodecError> {
    match value {
        Value::String(text) => parse_pattern(text),
        Value::Object(map) => pattern_from_record(map),
        other => Err(CodecError::MalformedPattern(format!(
            "expected a pattern string or record, got {other}"
        ))),
    }
}

/// Render a pattern in description form
///
/// Patterns without a name or inversion render as plain text; the others as
/// a record.
pub fn pattern_to_value(pattern: &Pattern) -> Value {
    if pattern.name.is_none() && !pattern.invert {
        return Value::String(pattern.to_text());
    }

    let mut map = Map::new();
    map.insert("pattern".to_string(), Value::String(pattern.to_text()));
    if let Some(name) = &pattern.name {
        map.insert("name".to_string(), Value::String(name.clone()));
    }
    if pattern.invert {
        map.insert("invert".to_string(), Value::Bool(true));
    }
    Value::Object(map)
}

fn pattern_from_record(map: &Map<String, Value>) -> Result<Pattern, CodecError> {
    let text = match map.get("pattern") {
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(CodecError::MalformedPattern(format!(
                "'pattern' must be a string, got {other}"
            )));
        }
        None => {
            return Err(CodecError::MalformedPattern(
                "pattern record is missing 'pattern'".to_string(),
            ));
        }
    };

    let mut pattern = parse_pattern(text)?;

    for (key, value) in map {
        match (key.as_str(), value) {
            ("pattern", _) => {}
            ("flags", Value::String(extra)) => {
                let mut flags = pattern.flags.clone();
                for flag in extra.chars() {
                    if !INLINE_FLAGS.contains(&flag) && !INERT_FLAGS.contains(&flag) {
                        return Err(CodecError::MalformedPattern(format!(
                            "unsupported flag '{flag}'"
                        )));
                    }
                    flags.insert(flag);
                }
                let Pattern { name, invert, .. } = pattern;
                pattern = Pattern::compile(text_source(text).to_string(), flags)?;
                pattern.name = name;
                pattern.invert = invert;
            }
            ("name", Value::String(name)) => pattern.name = Some(name.clone()),
            ("invert", Value::Bool(invert)) => pattern.invert = *invert,
            (other, _) => {
                return Err(CodecError::MalformedPattern(format!(
                    "unsupported pattern option '{other}'"
                )));
            }
        }
    }

    Ok(pattern)
}

fn text_source(text: &str) -> &str {
    split_literal(text).map_or(text, |(source, _)| source)
}

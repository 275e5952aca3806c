//! Conversion between textual reference/pattern notation and their typed forms

pub mod pattern;
pub mod reference;

pub use pattern::{Pattern, parse_pattern, pattern_from_value, pattern_to_value};
pub use reference::{
    Operand, REF_KEY, RefTarget, Reference, parse_reference, reference_from_notation,
    reference_from_value, reference_to_value,
};

//! Output formatters (human and JSONL)

pub mod directive_list;
pub mod human;
pub mod jsonl;

pub use directive_list::{DirectiveInfo, DirectiveListHumanFormatter, DirectiveListJsonlFormatter};
pub use human::HumanFormatter;
pub use jsonl::JsonlFormatter;

#![forbid(unsafe_code)]

//! Directive grammar table
//!
//! Every directive name maps to exactly one argument-shape category. The
//! compiler uses the category to turn a directive value into engine
//! arguments; the extractor uses the same entry to turn a recorded rule back
//! into a directive value.

use std::collections::HashMap;
use std::sync::LazyLock;

/// How a unary directive's argument goes through the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Passed as-is
    Literal,
    /// The whole value may be a reference
    Operand,
    /// The value, or the named key of an object form, may be a reference
    Limit(&'static str),
    /// Each element of a list value may be a reference
    Elements,
}

/// Where an option-keyed directive finds its second argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secondary {
    /// Every key besides the primary one, as an options object
    Options,
    /// One named key, passed as-is
    Key(&'static str),
    /// One named key holding a transform function name
    FunctionKey(&'static str),
}

/// Option-keyed argument layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionKey {
    pub primary: &'static str,
    /// Whether the primary value names a registered transform
    pub primary_function: bool,
    pub secondary: Secondary,
}

/// Directives with a fixed, directive-specific shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bespoke {
    Unique,
    Rename,
    Replace,
    Assert,
    /// `with` / `without`: key, peers, options
    KeyPeers,
    /// `when` / `conditional`: condition plus branch options
    Condition,
}

/// Argument-shape category of a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Toggle,
    OptionalConfig,
    Unary(Coercion),
    OptionKeyed(OptionKey),
    Spread,
    PeerGroup,
    Pattern,
    Bespoke(Bespoke),
}

impl Category {
    /// Short category name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Toggle => "toggle",
            Category::OptionalConfig => "optional-config",
            Category::Unary(_) => "unary",
            Category::OptionKeyed(_) => "option-keyed",
            Category::Spread => "spread",
            Category::PeerGroup => "peer-group",
            Category::Pattern => "pattern",
            Category::Bespoke(_) => "bespoke",
        }
    }

    /// Human-readable argument shape
    pub fn shape(&self) -> &'static str {
        match self {
            Category::Toggle => "no argument",
            Category::OptionalConfig => "true, or one configuration value",
            Category::Unary(Coercion::Literal) => "one value",
            Category::Unary(Coercion::Operand) => "one value or reference",
            Category::Unary(Coercion::Limit(_)) => "value or reference, or {limit, ...options}",
            Category::Unary(Coercion::Elements) => "value or list of values/references",
            Category::OptionKeyed(_) => "value, or {primary, ...secondary}",
            Category::Spread => "list of positional arguments",
            Category::PeerGroup => "list of peers, or {peers, options}",
            Category::Pattern => "pattern, or {pattern, options, schema}",
            Category::Bespoke(Bespoke::Unique) => "true, or {comparator, options}",
            Category::Bespoke(Bespoke::Rename) => "{from, to, ...options}",
            Category::Bespoke(Bespoke::Replace) => "{find, replace} or a list of them",
            Category::Bespoke(Bespoke::Assert) => "{reference, schema, message} or [reference, schema, message]",
            Category::Bespoke(Bespoke::KeyPeers) => "{key, peers, options} or [key, peers, options]",
            Category::Bespoke(Bespoke::Condition) => "{reference | schema, ...branches}",
        }
    }
}

/// One row of the grammar table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub name: &'static str,
    pub category: Category,
    /// Whether `extract` can rebuild this directive from a validator
    pub reversible: bool,
}

const fn entry(name: &'static str, category: Category) -> Directive {
    Directive {
        name,
        category,
        reversible: true,
    }
}

const fn write_only(name: &'static str, category: Category) -> Directive {
    Directive {
        name,
        category,
        reversible: false,
    }
}

const fn toggle(name: &'static str) -> Directive {
    entry(name, Category::Toggle)
}

const fn config(name: &'static str) -> Directive {
    entry(name, Category::OptionalConfig)
}

const fn unary(name: &'static str) -> Directive {
    entry(name, Category::Unary(Coercion::Literal))
}

const fn limit(name: &'static str, key: &'static str) -> Directive {
    entry(name, Category::Unary(Coercion::Limit(key)))
}

const fn elements(name: &'static str) -> Directive {
    entry(name, Category::Unary(Coercion::Elements))
}

/// Every directive the compiler understands
pub static DIRECTIVES: &[Directive] = &[
    // presence and modes
    toggle("exist"),
    toggle("forbidden"),
    toggle("keep"),
    toggle("optional"),
    toggle("required"),
    toggle("warn"),
    toggle("warning"),
    // number
    toggle("integer"),
    toggle("negative"),
    toggle("port"),
    toggle("positive"),
    // string
    toggle("alphanum"),
    toggle("creditCard"),
    toggle("hostname"),
    toggle("insensitive"),
    toggle("isoDate"),
    toggle("isoDuration"),
    toggle("lowercase"),
    toggle("token"),
    toggle("uppercase"),
    // date
    toggle("iso"),
    // optional configuration
    config("empty"),
    config("base64"),
    config("dataUri"),
    config("domain"),
    config("email"),
    config("guid"),
    config("hex"),
    config("ip"),
    config("normalize"),
    config("uri"),
    config("uuid"),
    config("schema"),
    config("sort"),
    // single argument
    elements("allow"),
    unary("alter"),
    unary("cast"),
    unary("concat"),
    entry("default", Category::Unary(Coercion::Operand)),
    unary("description"),
    elements("disallow"),
    elements("equal"),
    unary("error"),
    unary("extract"),
    unary("failover"),
    unary("id"),
    elements("invalid"),
    unary("label"),
    unary("message"),
    unary("messages"),
    unary("meta"),
    elements("not"),
    unary("note"),
    unary("only"),
    unary("options"),
    unary("prefs"),
    unary("preferences"),
    unary("presence"),
    unary("raw"),
    unary("rule"),
    unary("shared"),
    unary("strict"),
    unary("strip"),
    unary("tag"),
    unary("tailor"),
    unary("unit"),
    elements("valid"),
    unary("validate"),
    unary("falsy"),
    unary("sensitive"),
    unary("truthy"),
    limit("greater", "limit"),
    limit("less", "limit"),
    limit("multiple", "base"),
    unary("precision"),
    unary("sign"),
    unary("unsafe"),
    unary("case"),
    unary("trim"),
    unary("truncate"),
    unary("append"),
    unary("keys"),
    unary("unknown"),
    unary("has"),
    unary("single"),
    unary("sparse"),
    unary("encoding"),
    unary("timestamp"),
    unary("match"),
    limit("min", "limit"),
    limit("max", "limit"),
    limit("length", "limit"),
    unary("map"),
    // with options
    entry(
        "example",
        Category::OptionKeyed(OptionKey {
            primary: "example",
            primary_function: false,
            secondary: Secondary::Options,
        }),
    ),
    write_only(
        "external",
        Category::OptionKeyed(OptionKey {
            primary: "method",
            primary_function: true,
            secondary: Secondary::Key("description"),
        }),
    ),
    write_only(
        "fork",
        Category::OptionKeyed(OptionKey {
            primary: "paths",
            primary_function: false,
            secondary: Secondary::FunctionKey("adjuster"),
        }),
    ),
    // spread
    entry("items", Category::Spread),
    entry("ordered", Category::Spread),
    entry("try", Category::Spread),
    // peers
    entry("and", Category::PeerGroup),
    entry("nand", Category::PeerGroup),
    entry("or", Category::PeerGroup),
    entry("oxor", Category::PeerGroup),
    entry("xor", Category::PeerGroup),
    // patterns
    entry("pattern", Category::Pattern),
    entry("regex", Category::Pattern),
    // bespoke
    entry("unique", Category::Bespoke(Bespoke::Unique)),
    entry("rename", Category::Bespoke(Bespoke::Rename)),
    entry("replace", Category::Bespoke(Bespoke::Replace)),
    write_only("assert", Category::Bespoke(Bespoke::Assert)),
    write_only("with", Category::Bespoke(Bespoke::KeyPeers)),
    write_only("without", Category::Bespoke(Bespoke::KeyPeers)),
    write_only("when", Category::Bespoke(Bespoke::Condition)),
    write_only("conditional", Category::Bespoke(Bespoke::Condition)),
];

static INDEX: LazyLock<HashMap<&'static str, &'static Directive>> =
    LazyLock::new(|| DIRECTIVES.iter().map(|d| (d.name, d)).collect());

/// Look up a directive by name
pub fn lookup(name: &str) -> Option<&'static Directive> {
    INDEX.get(name).copied()
}

/// Iterate over the table in declaration order
pub fn iter() -> impl Iterator<Item = &'static Directive> {
    DIRECTIVES.iter()
}

//! Table constructor and indexing cleanup.

use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict};
use crate::util::PassConfig;
use regex::Regex;
use std::sync::LazyLock;

static POSITIONAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,;])(\s*)\[\s*\d+\s*\]\s*=\s*").expect("table key pattern is valid")
});

static QUOTED_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\s*(?:"([A-Za-z_][A-Za-z0-9_]*)"|'([A-Za-z_][A-Za-z0-9_]*)')\s*\]"#)
        .expect("index pattern is valid")
});

const LUA_KEYWORDS: [&str; 22] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// `{[1] = a, [2] = b}` → `{a, b}`.
pub static NUMERIC_TABLE_KEYS: RewriteRule = RewriteRule::new(
    "numeric_table_keys",
    &POSITIONAL_KEY,
    Scope::Code,
    Producer::Template("${1}${2}"),
);

/// `game["Players"]` → `game.Players`.
pub static STRING_INDEX: RewriteRule = RewriteRule::new(
    "string_index",
    &QUOTED_INDEX,
    Scope::Code,
    Producer::Fold(dot_index),
);

fn dot_index(site: &Site<'_>, _: &PassConfig) -> Verdict {
    // only an index on an expression, never a table constructor key like `{["a"] = 1}`
    let indexes = site
        .char_before()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | ')' | ']'));
    let Some(name) = site.group(1).or_else(|| site.group(2)) else {
        return Verdict::Keep;
    };
    if !indexes || LUA_KEYWORDS.contains(&name) {
        return Verdict::Keep;
    }
    Verdict::Replace(format!(".{name}"))
}

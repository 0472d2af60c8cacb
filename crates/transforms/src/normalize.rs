//! Whitespace normalization that later rules rely on for exact adjacency.

use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict};
use crate::util::PassConfig;
use regex::Regex;
use std::sync::LazyLock;

static INNER_BRACKET_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([(\[])[ \t]+|[ \t]+([)\]])").expect("bracket spacing pattern is valid")
});

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("trailing space pattern is valid"));

/// `f( a, b )` → `f(a, b)`, `t[ 1 ]` → `t[1]`.
pub static BRACKET_SPACING: RewriteRule = RewriteRule::new(
    "bracket_spacing",
    &INNER_BRACKET_SPACE,
    Scope::Code,
    Producer::Fold(keep_bracket),
);

pub static TRAILING_WHITESPACE: RewriteRule = RewriteRule::new(
    "trailing_whitespace",
    &TRAILING_SPACE,
    Scope::Anywhere,
    Producer::Template(""),
);

fn keep_bracket(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let bracket = site.group(1).or_else(|| site.group(2)).unwrap_or_default();
    Verdict::Replace(bracket.to_string())
}

//! Header erasure rules.
//!
//! Each of these discards information on purpose: the original parameter list, loop bounds or
//! condition is replaced with a fixed placeholder so the shape of the control flow is visible
//! without the noise the obfuscator put into the expressions.

use crate::loadstring::closing_paren;
use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict};
use crate::util::PassConfig;
use regex::Regex;
use std::sync::LazyLock;

static ANON_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\s*\([^)]*\)").expect("signature pattern is valid")
});

static NUMERIC_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfor\s+([A-Za-z_][A-Za-z0-9_]*)\s*=[^\n]*?\bdo\b")
        .expect("for header pattern is valid")
});

static PAREN_CONDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(if|while)\s*\(").expect("condition pattern is valid"));

static THEN_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*then\b").expect("then pattern is valid"));

static DO_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*do\b").expect("do pattern is valid"));

/// `function (a, b, c)` → `function(...)`.
pub static FUNCTION_SIGNATURE: RewriteRule = RewriteRule::new(
    "function_signature",
    &ANON_SIGNATURE,
    Scope::Code,
    Producer::Template("function(...)"),
);

/// `for i = <start>, <stop> do` → `for i = ... do`.
pub static LOOP_HEADER: RewriteRule = RewriteRule::new(
    "loop_header",
    &NUMERIC_FOR,
    Scope::Code,
    Producer::Template("for ${1} = ... do"),
);

/// `if (<cond>) then` → `if condition then`, `while (<cond>) do` → `while true do`.
pub static CONDITIONAL_HEADER: RewriteRule = RewriteRule::new(
    "conditional_header",
    &PAREN_CONDITION,
    Scope::Code,
    Producer::Fold(placeholder_condition),
);

/// Only fires when the parentheses hold the whole condition, i.e. the keyword closing the header
/// directly follows the matching `)`.
fn placeholder_condition(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let Some(close) = closing_paren(site.rest()) else {
        return Verdict::Keep;
    };
    let after = site.end() + close + 1;
    let (keyword, with) = match site.group(1) {
        Some("if") => (&THEN_KEYWORD, "if condition then"),
        _ => (&DO_KEYWORD, "while true do"),
    };
    match keyword.find(&site.text[after..]) {
        Some(m) => Verdict::ReplaceThrough {
            end: after + m.end(),
            with: with.into(),
        },
        None => Verdict::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &RewriteRule, src: &str) -> String {
        rule.rewrite(src, &PassConfig::default()).unwrap().text
    }

    #[test]
    fn test_anonymous_signature_erased() {
        assert_eq!(
            run(&FUNCTION_SIGNATURE, "local f = function (a, b) return a end"),
            "local f = function(...) return a end"
        );
        assert_eq!(
            run(&FUNCTION_SIGNATURE, "function named(a) end"),
            "function named(a) end"
        );
    }

    #[test]
    fn test_loop_header_erased() {
        assert_eq!(
            run(&LOOP_HEADER, "for i = #t, 1, -1 do x() end"),
            "for i = ... do x() end"
        );
        assert_eq!(
            run(&LOOP_HEADER, "for k, v in pairs(t) do end"),
            "for k, v in pairs(t) do end"
        );
    }

    #[test]
    fn test_conditions_erased() {
        assert_eq!(
            run(&CONDITIONAL_HEADER, "if (a and b) then x() end"),
            "if condition then x() end"
        );
        assert_eq!(
            run(&CONDITIONAL_HEADER, "while (n > 0) do n = n - 1 end"),
            "while true do n = n - 1 end"
        );
        assert_eq!(
            run(&CONDITIONAL_HEADER, "if ready then go() end"),
            "if ready then go() end"
        );
    }

    #[test]
    fn test_partial_parentheses_kept() {
        assert_eq!(
            run(
                &CONDITIONAL_HEADER,
                "if (a + b) > c then foo() end if (d) then bar() end"
            ),
            "if (a + b) > c then foo() end if condition then bar() end"
        );
        assert_eq!(
            run(&CONDITIONAL_HEADER, "while (f(x)) do g() end while (i) < 3 do end"),
            "while true do g() end while (i) < 3 do end"
        );
        assert_eq!(run(&CONDITIONAL_HEADER, "if (open then"), "if (open then");
    }
}

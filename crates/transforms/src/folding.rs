//! Literal folding: computes what the obfuscator spelled out at runtime.

use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict, parse_int};
use crate::util::PassConfig;
use luaclear_core::decoder::quote_literal;
use luaclear_utils::errors::DecodeError;
use regex::Regex;
use std::sync::LazyLock;

static STRING_CHAR_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstring\.char\(\s*(\d+(?:\s*,\s*\d+)*)\s*\)").expect("char call pattern is valid")
});

static INTEGER_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+)\s*([+-])\s*(\d+)\b").expect("integer pair pattern is valid")
});

static ADJACENT_STRINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          (?: "((?:[^"\\\n]|\\.)*)" | '((?:[^'\\\n]|\\.)*)' )
          \s*\.\.\s*
          (?: "((?:[^"\\\n]|\\.)*)" | '((?:[^'\\\n]|\\.)*)' )
        "#,
    )
    .expect("concat pattern is valid")
});

/// `string.char(72, 105)` → `"Hi"`.
pub static CHAR_CODES: RewriteRule = RewriteRule::new(
    "char_codes",
    &STRING_CHAR_CALL,
    Scope::Code,
    Producer::Fold(fold_char_codes),
);

/// `3 + 4` → `7` when nothing else binds to either operand.
pub static INTEGER_ARITHMETIC: RewriteRule = RewriteRule::new(
    "integer_arithmetic",
    &INTEGER_PAIR,
    Scope::Code,
    Producer::Fold(fold_integer_pair),
);

/// `"ab" .. 'cd'` → `"abcd"`. A single pass, so three literals fold to two.
///
/// Both operands keep their escapes as written; only a bare `"` from a single-quoted operand
/// needs escaping once the result is double-quoted.
pub static STRING_CONCAT: RewriteRule = RewriteRule::new(
    "string_concat",
    &ADJACENT_STRINGS,
    Scope::StringStart,
    Producer::Fold(fold_concat),
);

fn fold_char_codes(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let codes = site.group(1).unwrap_or_default();
    let mut decoded = String::new();
    for code in codes.split(',') {
        let code = code.trim();
        let Ok(value) = code.parse::<u64>() else {
            return Verdict::Skip(DecodeError::Integer(code.to_string()));
        };
        match u8::try_from(value) {
            Ok(byte) => decoded.push(char::from(byte)),
            Err(_) => return Verdict::Skip(DecodeError::CodePoint(value)),
        }
    }
    Verdict::Replace(quote_literal(&decoded))
}

fn fold_concat(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let operand = |dq: usize, sq: usize| match (site.group(dq), site.group(sq)) {
        (Some(body), _) => body.to_string(),
        (None, Some(body)) => escape_bare_quotes(body),
        (None, None) => String::new(),
    };
    Verdict::Replace(format!("\"{}{}\"", operand(1, 2), operand(3, 4)))
}

/// Escapes `"` characters that are not already part of an escape sequence.
fn escape_bare_quotes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut escaped = false;
    for c in body.chars() {
        if c == '"' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

/// Characters that bind an operand to something outside the matched pair.
fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%' | '^' | '#' | '.')
}

fn fold_integer_pair(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let glued = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if glued(site.char_before()) || glued(site.char_after()) {
        return Verdict::Keep;
    }
    if site.prev_non_blank().is_some_and(is_operator)
        || site.next_non_blank().is_some_and(is_operator)
    {
        return Verdict::Keep;
    }

    let (lhs, rhs) = match (
        parse_int(site.group(1).unwrap_or_default()),
        parse_int(site.group(3).unwrap_or_default()),
    ) {
        (Ok(lhs), Ok(rhs)) => (lhs, rhs),
        (Err(e), _) | (_, Err(e)) => return Verdict::Skip(e),
    };
    let folded = match site.group(2) {
        Some("-") => lhs.checked_sub(rhs),
        _ => lhs.checked_add(rhs),
    };
    match folded {
        Some(value) => Verdict::Replace(value.to_string()),
        None => Verdict::Skip(DecodeError::Integer(site.matched().to_string())),
    }
}

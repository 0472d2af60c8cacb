//! Expansion of numeric `for` loops whose bounds are integer literals.

use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict, parse_int};
use crate::util::PassConfig;
use luaclear_core::lexical::{TokenKind, matching_end, scan};
use luaclear_utils::errors::DecodeError;
use regex::Regex;
use std::sync::LazyLock;

static LITERAL_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfor\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(-?\d+)\s*,\s*(-?\d+)\s*do\b")
        .expect("range pattern is valid")
});

static LOOP_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(break|goto|return)\b").expect("control pattern is valid"));

/// `for i = 1, 3 do f(i) end` → `i = 1\nf(i)\ni = 2\nf(i)\ni = 3\nf(i)`.
///
/// The loop variable becomes a plain assignment before each copy of the body. Loops with a step,
/// loops whose body can leave early, and loops without a matching `end` are left alone.
pub static RANGE_UNROLL: RewriteRule = RewriteRule::new(
    "range_unroll",
    &LITERAL_RANGE,
    Scope::Code,
    Producer::Fold(unroll),
);

fn unroll(site: &Site<'_>, config: &PassConfig) -> Verdict {
    let var = site.group(1).unwrap_or_default();
    let (start, stop) = match (
        parse_int(site.group(2).unwrap_or_default()),
        parse_int(site.group(3).unwrap_or_default()),
    ) {
        (Ok(start), Ok(stop)) => (start, stop),
        (Err(e), _) | (_, Err(e)) => return Verdict::Skip(e),
    };

    let Some(end) = matching_end(site.text, site.end()) else {
        return Verdict::Skip(DecodeError::UnterminatedBlock);
    };
    let body = &site.text[site.end()..end.start];
    if let Some(word) = leaves_early(body) {
        return Verdict::Skip(DecodeError::LoopControl(word));
    }

    let iterations = if stop < start {
        0
    } else {
        match u64::try_from(i128::from(stop) - i128::from(start) + 1) {
            Ok(n) => n,
            Err(_) => return Verdict::Skip(DecodeError::RangeOverflow { start, stop }),
        }
    };
    if let Some(limit) = config.max_unroll {
        if iterations > limit {
            return Verdict::Skip(DecodeError::UnrollLimit { iterations, limit });
        }
    }

    let body = body.trim();
    let mut lines = Vec::new();
    if iterations > 0 {
        for value in start..=stop {
            lines.push(format!("{var} = {value}"));
            if !body.is_empty() {
                lines.push(body.to_string());
            }
        }
    }
    Verdict::ReplaceThrough {
        end: end.end,
        with: lines.join("\n"),
    }
}

/// First `break`, `goto` or `return` in the code of `body`.
fn leaves_early(body: &str) -> Option<String> {
    scan(body)
        .into_iter()
        .filter(|t| t.kind == TokenKind::Code)
        .find_map(|t| LOOP_CONTROL.find(t.text).map(|m| m.as_str().to_string()))
}

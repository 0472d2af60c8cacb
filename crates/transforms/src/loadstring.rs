//! Marks dynamic code loading instead of running it.

use crate::rule::{Producer, RewriteRule, Scope, Site, Verdict};
use crate::util::PassConfig;
use luaclear_utils::errors::DecodeError;
use regex::Regex;
use std::sync::LazyLock;

static LOADSTRING_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bloadstring\s*\(").expect("loadstring pattern is valid"));

static IMMEDIATE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*\)").expect("call suffix pattern is valid"));

/// `loadstring(src)()` → `-- Decompiled loadstring: src` on a line of its own.
pub static LOADSTRING: RewriteRule = RewriteRule::new(
    "loadstring",
    &LOADSTRING_CALL,
    Scope::Code,
    Producer::Fold(mark_loadstring),
);

fn mark_loadstring(site: &Site<'_>, _: &PassConfig) -> Verdict {
    let Some(close) = closing_paren(site.rest()) else {
        return Verdict::Skip(DecodeError::Unbalanced);
    };
    let arg = site.rest()[..close].trim();
    let mut end = site.end() + close + 1;
    if let Some(call) = IMMEDIATE_CALL.find(&site.text[end..]) {
        end += call.end();
    }

    let arg = arg.split_whitespace().collect::<Vec<_>>().join(" ");
    Verdict::ReplaceThrough {
        end,
        with: format!("\n-- Decompiled loadstring: {arg}\n"),
    }
}

/// Offset in `text` of the `)` closing an already opened parenthesis.
///
/// Parentheses inside quoted strings are ignored.
pub(crate) fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

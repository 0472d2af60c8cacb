//! Module for computing readability metrics to evaluate deobfuscation passes.
//!
//! Implements a minimal set of metrics quantified by text size, structural depth, and the
//! amount of obfuscation residue still visible (machine-style identifiers, hex escapes, encoded
//! calls) to assess how much analyst effort a script still demands. The module provides
//! functions to collect metrics from script text and compare pre- and post-pass states.
//!
//! # Usage
//! ```rust
//! use luaclear_analysis::{collect_metrics, compare};
//!
//! let before = collect_metrics(r#"local _0x1f = "\x68\x69""#);
//! let after = collect_metrics(r#"local var_1 = "hi""#);
//! assert!(compare(&before, &after) > 0.0);
//! ```
use luaclear_core::formatter;
use luaclear_core::lexical::{TokenKind, scan};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("word pattern is valid"));

static HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x[0-9a-fA-F]{2}").expect("escape pattern is valid"));

static ENCODED_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:base64\.decode|string\.char|loadstring)\s*\(")
        .expect("encoded call pattern is valid")
});

/// Identifiers this long are treated as generated.
const LONG_NAME: usize = 24;

/// Represents a set of readability metrics for a script.
///
/// Metrics include size, structure, and obfuscation residue. Used to compare pre- and post-pass
/// states and report how much a run improved the script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Size of the script text in bytes.
    pub byte_len: usize,
    /// Number of non-blank lines.
    pub line_cnt: usize,
    /// Deepest block nesting seen by the structural formatter.
    pub max_depth: usize,
    /// Distinct identifiers that look machine generated (`_0x1f`, `IlIlIl`, very long names).
    pub opaque_ident_cnt: usize,
    /// Remaining `\xHH` escapes.
    pub escape_cnt: usize,
    /// Remaining `base64.decode(`, `string.char(` and `loadstring(` calls.
    pub encoded_call_cnt: usize,
    /// Composite obscurity score (higher means harder to read).
    pub obscurity: f64,
}

/// Collects metrics from script text.
///
/// Identifier counting looks at code only: names inside string literals and comments are
/// ignored. Escapes and encoded calls are counted anywhere in the text.
///
/// # Arguments
/// * `text` - The script text at any pipeline stage.
///
/// # Returns
/// A `Metrics` struct describing the text.
pub fn collect_metrics(text: &str) -> Metrics {
    let line_cnt = text.lines().filter(|l| !l.trim().is_empty()).count();
    let max_depth = formatter::max_depth(text);

    let mut opaque = HashSet::new();
    for token in scan(text) {
        if token.kind != TokenKind::Code {
            continue;
        }
        for m in WORD.find_iter(token.text) {
            if is_opaque_name(m.as_str()) {
                opaque.insert(m.as_str());
            }
        }
    }

    let escape_cnt = HEX_ESCAPE.find_iter(text).count();
    let encoded_call_cnt = ENCODED_CALL.find_iter(text).count();

    Metrics {
        byte_len: text.len(),
        line_cnt,
        max_depth,
        opaque_ident_cnt: opaque.len(),
        escape_cnt,
        encoded_call_cnt,
        obscurity: score(opaque.len(), escape_cnt, encoded_call_cnt, line_cnt),
    }
}

/// Heuristic for generated identifiers.
///
/// # Arguments
/// * `name` - An identifier token.
///
/// # Returns
/// `true` for `_0x`-hex names, names spelled only from look-alike glyphs (`I`, `l`, `1`, `_`)
/// of length four or more, and names of `LONG_NAME` characters or more.
pub fn is_opaque_name(name: &str) -> bool {
    if let Some(hex) = name.strip_prefix("_0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    let lookalike = name.len() >= 4
        && name.chars().all(|c| matches!(c, 'I' | 'l' | '1' | '_'))
        && name.chars().any(|c| matches!(c, 'I' | 'l'));
    lookalike || name.len() >= LONG_NAME
}

/// Computes a composite obscurity score.
///
/// Weights residue by how much each kind slows a reader down; a script that is one enormous
/// line is also penalised since it has not been re-laid out yet.
fn score(opaque: usize, escapes: usize, encoded: usize, lines: usize) -> f64 {
    let layout = if lines <= 1 { 5.0 } else { 0.0 };
    3.0 * opaque as f64 + 0.5 * escapes as f64 + 5.0 * encoded as f64 + layout
}

/// Compares two sets of metrics to evaluate a deobfuscation pass.
///
/// Computes the drop in obscurity, adjusted slightly for size growth so a pass that unrolls
/// a huge loop does not look free.
///
/// # Arguments
/// * `before` - Metrics before the pass.
/// * `after` - Metrics after the pass.
///
/// # Returns
/// A score representing the pass's effect (positive is more readable).
pub fn compare(before: &Metrics, after: &Metrics) -> f64 {
    before.obscurity - after.obscurity
        - 0.001 * (after.byte_len as f64 - before.byte_len as f64)
}

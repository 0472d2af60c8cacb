//! Structural formatter: re-derives indentation from block keywords alone.
//!
//! The buffer is cut into units at statement separators, block keywords and closing brackets
//! that are followed by the start of another statement. A unit that starts with a closing
//! keyword (`end`, `else`, `elseif`, `until`) lowers the depth before it is written; a unit that
//! ends with an opening keyword (`function …(…)`, `then`, `do`, `repeat`, `else`) raises it
//! afterwards. `end` closes its unit too, keeping only trailing `)`, `]`, `}` or `,` with it so
//! `end)` and `end,` stay whole. Depth saturates at zero and is not required to return to zero.

use crate::SourceBuffer;
use crate::lexical::{BlockKeyword, TokenKind, scan};
use regex::Regex;
use std::sync::LazyLock;

// `f() g()`: a closing bracket, blanks, then a word
static STATEMENT_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[)\]}][ \t]+([A-Za-z_][A-Za-z0-9_]*)").expect("statement break pattern is valid")
});

/// Words that continue an expression after a closing bracket.
const CONTINUATIONS: [&str; 3] = ["and", "or", "in"];

/// Current depth of the formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndentState {
    pub depth: usize,
    /// closing keywords seen at depth zero
    pub clamped: usize,
}

impl IndentState {
    pub const fn open(&mut self) {
        self.depth += 1;
    }

    /// Lowers depth by one, clamping at zero.
    pub const fn close(&mut self) {
        if self.depth == 0 {
            self.clamped += 1;
        } else {
            self.depth -= 1;
        }
    }
}

/// Output of [`format_source`].
#[derive(Debug, Clone)]
pub struct Formatted {
    pub buffer: SourceBuffer,
    /// depth left open at end of input
    pub final_depth: usize,
    pub clamped: usize,
    pub max_depth: usize,
}

/// Emits units at their depth, one per line.
#[derive(Debug)]
struct Emitter {
    state: IndentState,
    indent: String,
    line: String,
    pending_opens: usize,
    out: String,
    max_depth: usize,
}

impl Emitter {
    fn new(indent_width: usize) -> Self {
        Self {
            state: IndentState::default(),
            indent: " ".repeat(indent_width),
            line: String::new(),
            pending_opens: 0,
            out: String::new(),
            max_depth: 0,
        }
    }

    /// Appends code, starting a new unit after each closing bracket that ends a statement.
    fn push_code(&mut self, text: &str) {
        let mut last = 0;
        for caps in STATEMENT_BREAK.captures_iter(text) {
            let (Some(m), Some(word)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if CONTINUATIONS.contains(&word.as_str()) {
                continue;
            }
            let cut = m.start() + 1;
            self.line.push_str(&text[last..cut]);
            self.flush();
            last = cut;
        }
        self.line.push_str(&text[last..]);
    }

    /// Appends the code following an `end`, splitting off anything past its closing punctuation.
    fn push_after_end(&mut self, text: &str) {
        let rest = text.trim_start_matches([' ', '\t', ')', ']', '}', ',']);
        let attached = &text[..text.len() - rest.len()];
        self.line.push_str(attached);
        if !rest.trim().is_empty() && !attached.contains(',') {
            self.flush();
        }
        self.push_code(rest);
    }

    fn flush(&mut self) {
        let unit = self.line.trim();
        if !unit.is_empty() {
            for _ in 0..self.state.depth {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(unit);
            self.out.push('\n');
        }
        self.line.clear();
        for _ in 0..self.pending_opens {
            self.state.open();
        }
        self.pending_opens = 0;
        self.max_depth = self.max_depth.max(self.state.depth);
    }
}

/// Re-indents `source` with `indent_width` spaces per depth level.
pub fn format_source(source: &SourceBuffer, indent_width: usize) -> Formatted {
    let mut em = Emitter::new(indent_width);
    // a `function` unit stays open until its parameter list closes
    let mut in_signature = false;
    // the unit ends once the punctuation after an `end` has been taken
    let mut after_end = false;

    for token in scan(source.as_str()) {
        let ended = std::mem::take(&mut after_end);
        match token.kind {
            TokenKind::Code if in_signature => match token.text.find(')') {
                Some(i) => {
                    em.line.push_str(&token.text[..=i]);
                    em.flush();
                    em.push_code(&token.text[i + 1..]);
                    in_signature = false;
                }
                None => em.line.push_str(token.text),
            },
            TokenKind::Code if ended => em.push_after_end(token.text),
            TokenKind::Code => em.push_code(token.text),
            TokenKind::Opaque => {
                // a trailing comment stays on the line it annotates
                if ended && !token.text.starts_with("--") {
                    em.flush();
                }
                em.line.push_str(token.text);
            }
            TokenKind::Separator(sep) => {
                if sep == ';' {
                    em.line.push(';');
                }
                in_signature = false;
                em.flush();
            }
            TokenKind::Keyword(k) => {
                // `f() function g()` starts a new statement at the keyword
                let starts_statement = matches!(k, BlockKeyword::Function | BlockKeyword::Repeat)
                    && em.line.trim_end().ends_with([')', ']', '}']);
                if k.closes() || ended || starts_statement {
                    em.flush();
                }
                if k.closes() {
                    em.state.close();
                }
                in_signature = false;
                after_end = k == BlockKeyword::End;
                push_word(&mut em.line, k.as_str());
                if k.opens() {
                    em.pending_opens += 1;
                    if k == BlockKeyword::Function {
                        in_signature = true;
                    } else {
                        em.flush();
                    }
                }
            }
        }
    }
    em.flush();

    tracing::debug!(
        "formatter: final depth {}, {} clamped closes, max depth {}",
        em.state.depth,
        em.state.clamped,
        em.max_depth
    );

    Formatted {
        buffer: SourceBuffer::new(em.out),
        final_depth: em.state.depth,
        clamped: em.state.clamped,
        max_depth: em.max_depth,
    }
}

/// Appends a keyword, keeping one space from whatever precedes it on the line.
fn push_word(line: &mut String, word: &str) {
    if !line.is_empty() && !line.ends_with(|c: char| c.is_whitespace() || "([{=".contains(c)) {
        line.push(' ');
    }
    line.push_str(word);
}

/// Maximum depth the formatter would reach on `text`.
pub fn max_depth(text: &str) -> usize {
    format_source(&SourceBuffer::new(text), 0).max_depth
}

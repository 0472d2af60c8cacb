//! Data-driven rewrite rules.
//!
//! A [`RewriteRule`] pairs a compiled pattern with a replacement producer. The producer is either
//! a static template expanded against the match's capture groups or a fold function that
//! inspects the match and its surroundings and returns a [`Verdict`]. Every rule is total: a
//! fragment it cannot handle is kept verbatim and reported as a [`DecodeSkip`].

use crate::util::{PassConfig, RewriteContext, Transform};
use luaclear_core::lexical::{in_spans, opaque_spans};
use luaclear_core::{DecodeSkip, SourceBuffer};
use luaclear_utils::errors::{DecodeError, TransformError};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

/// Where a rule is allowed to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Matches starting inside a string literal or comment are left alone.
    Code,
    /// Matches must begin at the opening quote of a string literal.
    StringStart,
    /// No restriction.
    Anywhere,
}

/// Produces the replacement for one match.
#[derive(Debug, Clone, Copy)]
pub enum Producer {
    /// `$1`/`${name}` template expanded against the match.
    Template(&'static str),
    /// Function deciding what happens to the match.
    Fold(fn(&Site<'_>, &PassConfig) -> Verdict),
}

/// Outcome of a fold function.
#[derive(Debug)]
pub enum Verdict {
    /// Replace the matched text.
    Replace(String),
    /// Replace from the match start up to the absolute offset `end`, which must not precede the
    /// end of the match.
    ReplaceThrough { end: usize, with: String },
    /// Leave the match as it is; nothing is reported.
    Keep,
    /// Leave the match as it is and record why it could not be rewritten.
    Skip(DecodeError),
}

/// A match together with the whole text it was found in.
#[derive(Debug)]
pub struct Site<'t> {
    pub text: &'t str,
    pub caps: &'t Captures<'t>,
}

impl<'t> Site<'t> {
    pub fn start(&self) -> usize {
        self.caps.get(0).map_or(0, |m| m.start())
    }

    pub fn end(&self) -> usize {
        self.caps.get(0).map_or(0, |m| m.end())
    }

    pub fn matched(&self) -> &'t str {
        self.caps.get(0).map_or("", |m| m.as_str())
    }

    pub fn group(&self, i: usize) -> Option<&'t str> {
        self.caps.get(i).map(|m| m.as_str())
    }

    /// Character immediately before the match.
    pub fn char_before(&self) -> Option<char> {
        self.text[..self.start()].chars().next_back()
    }

    /// Character immediately after the match.
    pub fn char_after(&self) -> Option<char> {
        self.text[self.end()..].chars().next()
    }

    /// First character before the match that is not a space or tab.
    pub fn prev_non_blank(&self) -> Option<char> {
        self.text[..self.start()]
            .chars()
            .rev()
            .find(|c| !matches!(c, ' ' | '\t'))
    }

    /// First character after the match that is not a space or tab.
    pub fn next_non_blank(&self) -> Option<char> {
        self.rest().chars().find(|c| !matches!(c, ' ' | '\t'))
    }

    /// Text following the match.
    pub fn rest(&self) -> &'t str {
        &self.text[self.end()..]
    }
}

/// Result of running one rule over a text.
#[derive(Debug, Clone, Default)]
pub struct Rewritten {
    pub text: String,
    pub hits: usize,
    pub skips: Vec<DecodeSkip>,
}

/// A named pattern → replacement rule.
pub struct RewriteRule {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
    scope: Scope,
    producer: Producer,
}

impl std::fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteRule")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl RewriteRule {
    pub const fn new(
        name: &'static str,
        pattern: &'static LazyLock<Regex>,
        scope: Scope,
        producer: Producer,
    ) -> Self {
        Self {
            name,
            pattern,
            scope,
            producer,
        }
    }

    /// Runs the rule once, left to right, over `text`.
    ///
    /// Matches are taken in order and never overlap; a match that starts inside text already
    /// consumed by a previous [`Verdict::ReplaceThrough`] is ignored.
    pub fn rewrite(&self, text: &str, config: &PassConfig) -> Result<Rewritten, TransformError> {
        let spans = match self.scope {
            Scope::Code | Scope::StringStart => opaque_spans(text),
            Scope::Anywhere => Vec::new(),
        };
        let candidates: Vec<Captures<'_>> = match self.scope {
            Scope::StringStart => self.string_start_matches(text, &spans),
            Scope::Code | Scope::Anywhere => self.pattern.captures_iter(text).collect(),
        };

        let mut out = Rewritten {
            text: String::with_capacity(text.len()),
            ..Default::default()
        };
        let mut last = 0;

        for caps in &candidates {
            let Some(m) = caps.get(0) else { continue };
            if m.start() < last || (self.scope == Scope::Code && in_spans(&spans, m.start())) {
                continue;
            }

            let verdict = match self.producer {
                Producer::Template(template) => {
                    let mut with = String::new();
                    caps.expand(template, &mut with);
                    Verdict::Replace(with)
                }
                Producer::Fold(fold) => fold(&Site { text, caps }, config),
            };

            match verdict {
                Verdict::Replace(with) => {
                    out.text.push_str(&text[last..m.start()]);
                    out.text.push_str(&with);
                    last = m.end();
                    out.hits += 1;
                }
                Verdict::ReplaceThrough { end, with } => {
                    if end < m.end() || end > text.len() || !text.is_char_boundary(end) {
                        return Err(TransformError::InvalidSpan {
                            rule: self.name,
                            start: m.start(),
                            end,
                        });
                    }
                    out.text.push_str(&text[last..m.start()]);
                    out.text.push_str(&with);
                    last = end;
                    out.hits += 1;
                }
                Verdict::Keep => {}
                Verdict::Skip(err) => out.skips.push(DecodeSkip::new(self.name, m.as_str(), &err)),
            }
        }
        out.text.push_str(&text[last..]);

        debug!(
            "{}: {} rewrites, {} skipped",
            self.name,
            out.hits,
            out.skips.len()
        );
        Ok(out)
    }

    /// Leftmost matches that start where one of `spans` starts.
    ///
    /// A rejected match only advances the search by one character, so a real match overlapping
    /// it is still found.
    fn string_start_matches<'t>(&self, text: &'t str, spans: &[Range<usize>]) -> Vec<Captures<'t>> {
        let mut found = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(caps) = self.pattern.captures_at(text, pos) else {
                break;
            };
            let Some(m) = caps.get(0) else { break };
            pos = if spans.binary_search_by_key(&m.start(), |s| s.start).is_ok() {
                let next = m.end().max(m.start() + 1);
                found.push(caps);
                next
            } else {
                m.start() + 1
            };
            while pos < text.len() && !text.is_char_boundary(pos) {
                pos += 1;
            }
        }
        found
    }
}

impl Transform for RewriteRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(
        &self,
        source: &mut SourceBuffer,
        cx: &mut RewriteContext<'_>,
    ) -> Result<bool, TransformError> {
        let out = self.rewrite(source.as_str(), cx.config)?;
        cx.hits += out.hits;
        cx.skips.extend(out.skips);

        let changed = out.text != source.as_str();
        if changed {
            *source = SourceBuffer::new(out.text);
        }
        Ok(changed)
    }
}

/// Parses a decimal integer literal.
pub(crate) fn parse_int(literal: &str) -> Result<i64, DecodeError> {
    literal
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::Integer(literal.trim().to_string()))
}

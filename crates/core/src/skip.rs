use luaclear_utils::errors::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest fragment kept verbatim in a skip record.
const FRAGMENT_LIMIT: usize = 80;

/// A fragment a decoder or rewrite rule left untouched because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSkip {
    /// rule or decoder stage that gave up
    pub rule: String,
    /// the original text, shortened for reporting
    pub fragment: String,
    /// human readable reason
    pub reason: String,
}

impl DecodeSkip {
    pub fn new(rule: &str, fragment: &str, error: &DecodeError) -> Self {
        let skip = Self {
            rule: rule.to_string(),
            fragment: shorten(fragment),
            reason: error.to_string(),
        };
        tracing::warn!("skipped {}: {} ⇒ `{}`", skip.rule, skip.reason, skip.fragment);
        skip
    }
}

impl fmt::Display for DecodeSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ⇒ `{}`", self.rule, self.reason, self.fragment)
    }
}

fn shorten(fragment: &str) -> String {
    let flat = fragment.replace('\n', "⏎");
    if flat.chars().count() <= FRAGMENT_LIMIT {
        return flat;
    }
    let mut out: String = flat.chars().take(FRAGMENT_LIMIT).collect();
    out.push('…');
    out
}

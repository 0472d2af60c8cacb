//! Deterministic renaming of cataloged identifiers to `prefix_N` synthetic names.
//!
//! A [`RenameMap`] is built once per run from the catalog, applied once, and dropped. Numbering
//! always starts at 1 and follows first-occurrence order, so renaming already renamed text maps
//! every name to itself.

use crate::{IdentKind, SourceBuffer};
use indexmap::IndexMap;
use luaclear_utils::errors::RenameError;
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static VALID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("prefix pattern is valid"));

/// Compiled alternations of a few thousand names exceed the default regex size limit.
const PATTERN_SIZE_LIMIT: usize = 64 << 20;

/// Original name → synthetic name for one identifier kind.
#[derive(Debug, Clone, Serialize)]
pub struct RenameMap {
    kind: IdentKind,
    prefix: String,
    entries: IndexMap<String, String>,
}

impl RenameMap {
    /// Assigns `prefix_1`, `prefix_2`, … to each distinct name in first-occurrence order.
    pub fn build<'a>(
        kind: IdentKind,
        prefix: &str,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, RenameError> {
        if !VALID_PREFIX.is_match(prefix) {
            return Err(RenameError::InvalidPrefix(prefix.to_string()));
        }

        let mut entries = IndexMap::new();
        for name in names {
            if !entries.contains_key(name) {
                let synthetic = format!("{}_{}", prefix, entries.len() + 1);
                entries.insert(name.to_string(), synthetic);
            }
        }

        Ok(Self {
            kind,
            prefix: prefix.to_string(),
            entries,
        })
    }

    pub const fn kind(&self) -> IdentKind {
        self.kind
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitutes every entry across the whole buffer in a single pass.
    ///
    /// Matching is whole-token: `x` never matches inside `xs`, `_x` or `max`. All entries are
    /// replaced simultaneously, so a map such as `{a → var_1, var_1 → var_2}` cannot collapse two
    /// names into one. On any error `source` is left as it was and no partial result exists.
    pub fn apply(&self, source: &SourceBuffer) -> Result<SourceBuffer, RenameError> {
        if self.entries.is_empty() {
            return Ok(source.clone());
        }

        let pattern = token_alternation(self.entries.keys().map(String::as_str));
        let re = RegexBuilder::new(&pattern)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;

        self.check_conflicts(source.as_str())?;

        let renamed = re.replace_all(source.as_str(), |caps: &Captures<'_>| {
            self.entries
                .get(&caps[0])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });

        tracing::debug!(
            "renamed {} distinct {} names with prefix `{}`",
            self.entries.len(),
            self.kind,
            self.prefix
        );
        Ok(SourceBuffer::new(renamed.into_owned()))
    }

    /// A synthetic name is unsafe when it already names something that is not being renamed.
    fn check_conflicts(&self, text: &str) -> Result<(), RenameError> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for (original, synthetic) in &self.entries {
            if !seen.insert(synthetic.as_str()) {
                return Err(RenameError::Conflict {
                    original: original.clone(),
                    synthetic: synthetic.clone(),
                });
            }
        }

        let targets = token_alternation(self.entries.values().map(String::as_str));
        let re = RegexBuilder::new(&targets)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;

        if let Some(m) = re
            .find_iter(text)
            .find(|m| !self.entries.contains_key(m.as_str()))
        {
            let original = self
                .entries
                .iter()
                .find(|(_, synthetic)| synthetic.as_str() == m.as_str())
                .map(|(original, _)| original.clone())
                .unwrap_or_default();
            return Err(RenameError::Conflict {
                original,
                synthetic: m.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// `\b(?:a|b|c)\b` over escaped names.
fn token_alternation<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let body = names.map(regex::escape).collect::<Vec<_>>().join("|");
    format!(r"\b(?:{body})\b")
}

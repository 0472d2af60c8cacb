//! Identifier catalog: declaration sites found by surface scan.
//!
//! Only two shapes are recognised, `local <name> =` and `function <name>(`. A name inside a
//! string that happens to look like a declaration is still reported; scope is not tracked.

use crate::SourceBuffer;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LOCAL_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blocal\s+(\w+)\s*=").expect("local pattern is valid"));

static FUNCTION_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+(\w+)\s*\(").expect("function pattern is valid"));

/// What kind of declaration introduced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentKind {
    Variable,
    Function,
}

impl IdentKind {
    /// Prefix used for synthetic names unless configured otherwise.
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Variable => "var",
            Self::Function => "func",
        }
    }
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => write!(f, "variable"),
            Self::Function => write!(f, "function"),
        }
    }
}

/// A declared name and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub kind: IdentKind,
    /// byte offset of the name in the scanned buffer
    pub offset: usize,
}

/// Declarations in first-occurrence order, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub variables: Vec<Identifier>,
    pub functions: Vec<Identifier>,
}

impl Catalog {
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|i| i.name.as_str())
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|i| i.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty()
    }
}

/// Scans `source` for local-variable and named-function declarations.
pub fn find_identifiers(source: &SourceBuffer) -> Catalog {
    let text = source.as_str();
    let catalog = Catalog {
        variables: collect(&LOCAL_DECL, text, IdentKind::Variable),
        functions: collect(&FUNCTION_DECL, text, IdentKind::Function),
    };
    tracing::debug!(
        "catalog: {} variable sites, {} function sites",
        catalog.variables.len(),
        catalog.functions.len()
    );
    catalog
}

fn collect(re: &Regex, text: &str, kind: IdentKind) -> Vec<Identifier> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| Identifier {
            name: m.as_str().to_string(),
            kind,
            offset: m.start(),
        })
        .collect()
}

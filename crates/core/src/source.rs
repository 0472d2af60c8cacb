//! Owned script text threaded through the pipeline, plus its input/output boundary.

use luaclear_utils::errors::InputError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::{fmt, fs, path::Path};

/// The script text at one pipeline stage.
///
/// Stages borrow a buffer and return a new one; nothing aliases the text across stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
}

/// Metadata about the loaded source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// number of bytes
    pub byte_length: usize,
    /// Keccak-256 digest of the raw text, hex encoded
    pub keccak_hash: String,
    /// where the text came from
    pub source: SourceType,
}

/// Source type of the script input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// Read from a path on disk.
    File,
    /// Passed in as text.
    Inline,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads a script from disk as UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, SourceInfo), InputError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InputError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let buffer = Self::new(text);
        let info = buffer.info(SourceType::File);
        Ok((buffer, info))
    }

    /// Writes the buffer to `path`, terminated by exactly one trailing newline.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), InputError> {
        let path = path.as_ref();
        fs::write(path, self.terminated()).map_err(|e| InputError::FileWrite {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn info(&self, source: SourceType) -> SourceInfo {
        let mut hasher = Keccak256::new();
        hasher.update(self.text.as_bytes());
        SourceInfo {
            byte_length: self.text.len(),
            keccak_hash: hex::encode(hasher.finalize()),
            source,
        }
    }

    /// The text with trailing whitespace trimmed and a single `\n` appended.
    pub fn terminated(&self) -> String {
        let mut out = self.text.trim_end().to_string();
        out.push('\n');
        out
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<String> for SourceBuffer {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

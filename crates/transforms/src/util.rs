use luaclear_core::{DecodeSkip, SourceBuffer};
use luaclear_utils::errors::TransformError;
use serde::{Deserialize, Serialize};

/// Trait for source-to-source deobfuscation transforms.
pub trait Transform: Send + Sync {
    /// Returns the transform's name for logging and identification.
    fn name(&self) -> &'static str;
    /// Applies the transform to the buffer, returning whether changes were made.
    fn apply(
        &self,
        source: &mut SourceBuffer,
        cx: &mut RewriteContext<'_>,
    ) -> Result<bool, TransformError>;
}

/// Configuration for transform passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    /// Maximum number of iterations a literal-range loop may unroll into (`None` = uncapped)
    pub max_unroll: Option<u64>,
    /// Maximum growth a single rule may cause, as a ratio of its input (`None` = no gate)
    pub max_size_delta: Option<f32>,
    /// Spaces per indentation level in formatted output
    pub indent_width: usize,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            max_unroll: None,
            max_size_delta: None,
            indent_width: 4,
        }
    }
}

/// State a transform may read and append to while it runs.
#[derive(Debug)]
pub struct RewriteContext<'a> {
    pub config: &'a PassConfig,
    /// fragments left untouched because they could not be decoded or folded
    pub skips: Vec<DecodeSkip>,
    /// total replacements made so far
    pub hits: usize,
}

impl<'a> RewriteContext<'a> {
    pub const fn new(config: &'a PassConfig) -> Self {
        Self {
            config,
            skips: Vec::new(),
            hits: 0,
        }
    }
}

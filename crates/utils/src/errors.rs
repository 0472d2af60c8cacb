use thiserror::Error;

/// Error type for reading the script source or persisting the result.
///
/// Any of these aborts the run before an output file is created.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write file '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reason a single literal or idiom could not be decoded or folded.
///
/// These never abort a run: the fragment is kept verbatim and the reason is recorded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("decoded payload is not valid UTF-8")]
    Utf8,

    #[error("hex escape decode failed: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("character code {0} is outside 0..=255")]
    CodePoint(u64),

    #[error("integer literal out of range: {0}")]
    Integer(String),

    #[error("range {start}..={stop} has more iterations than can be counted")]
    RangeOverflow { start: i64, stop: i64 },

    #[error("range of {iterations} iterations exceeds unroll limit {limit}")]
    UnrollLimit { iterations: u64, limit: u64 },

    #[error("no matching `end` for loop body")]
    UnterminatedBlock,

    #[error("loop body contains `{0}`")]
    LoopControl(String),

    #[error("unbalanced parentheses in call")]
    Unbalanced,

    #[error("rule output grew buffer from {before} to {after} bytes")]
    SizeLimit { before: usize, after: usize },
}

/// Error type for building or applying a rename map.
#[derive(Debug, Error)]
pub enum RenameError {
    /// A synthetic name already occurs in the buffer as an unrelated identifier.
    #[error("synthetic name `{synthetic}` for `{original}` collides with an existing identifier")]
    Conflict { original: String, synthetic: String },

    #[error("invalid synthetic name prefix: `{0}`")]
    InvalidPrefix(String),

    #[error("rename pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Error type for rewrite rule application.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("rule `{rule}` produced an invalid replacement span {start}..{end}")]
    InvalidSpan {
        rule: &'static str,
        start: usize,
        end: usize,
    },
}

/// Error type for the external polish collaborator.
#[derive(Debug, Error)]
pub enum PolishError {
    #[error("failed to start polish command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("polish command i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("polish command exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("polish command returned non UTF-8 output")]
    Utf8,

    #[error("polish command returned no text")]
    EmptyResponse,
}

/// Errors that can occur while running the deobfuscation pipeline.
#[derive(Debug, Error)]
pub enum DeobfuscateError {
    /// Reading the source or writing the output failed.
    #[error("input error: {0}")]
    Input(#[from] InputError),
    /// Renaming could not be applied as one batch.
    #[error("rename error: {0}")]
    Rename(#[from] RenameError),
    /// A rewrite rule broke its contract.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    /// Unknown rule name requested.
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    /// Inconsistent configuration values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

//! Shared error types for the luaclear workspace.

pub mod errors;

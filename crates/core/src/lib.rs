pub mod catalog;
pub mod decoder;
pub mod formatter;
pub mod lexical;
pub mod rename;
pub mod skip;
pub mod source;

pub use catalog::{Catalog, IdentKind, Identifier};
pub use skip::DecodeSkip;
pub use source::{SourceBuffer, SourceInfo, SourceType};

pub mod deobfuscator;
pub mod folding;
pub mod headers;
pub mod loadstring;
pub mod normalize;
pub mod pass;
pub mod polish;
pub mod rule;
pub mod tables;
pub mod unroll;
pub mod util;

pub use rule::RewriteRule;
pub use util::{PassConfig, RewriteContext, Transform};

use luaclear_utils::errors::DeobfuscateError;

/// Every rewrite rule, in the order it runs.
///
/// Spacing is normalized before anything matches exact adjacency, literals fold before loops
/// unroll so folded bounds are seen, and unrolling runs before header erasure removes the bounds.
pub static CATALOGUE: [&RewriteRule; 12] = [
    &normalize::BRACKET_SPACING,
    &headers::FUNCTION_SIGNATURE,
    &folding::CHAR_CODES,
    &folding::INTEGER_ARITHMETIC,
    &tables::NUMERIC_TABLE_KEYS,
    &tables::STRING_INDEX,
    &folding::STRING_CONCAT,
    &unroll::RANGE_UNROLL,
    &headers::LOOP_HEADER,
    &headers::CONDITIONAL_HEADER,
    &loadstring::LOADSTRING,
    &normalize::TRAILING_WHITESPACE,
];

/// Looks up a catalogue rule by its name.
pub fn rule_by_name(name: &str) -> Option<&'static RewriteRule> {
    CATALOGUE.iter().copied().find(|rule| rule.name() == name)
}

/// Selects catalogue rules by name, keeping catalogue order.
///
/// Fails on the first name that is not in the catalogue.
pub fn rules_from_names<S: AsRef<str>>(
    names: &[S],
) -> Result<Vec<&'static RewriteRule>, DeobfuscateError> {
    if let Some(unknown) = names
        .iter()
        .map(AsRef::as_ref)
        .find(|name| rule_by_name(name).is_none())
    {
        return Err(DeobfuscateError::InvalidRule(unknown.to_string()));
    }
    Ok(CATALOGUE
        .iter()
        .copied()
        .filter(|rule| names.iter().any(|n| n.as_ref() == rule.name()))
        .collect())
}

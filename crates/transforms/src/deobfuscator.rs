use crate::pass::{self, RuleOutcome};
use crate::polish::Polisher;
use crate::{CATALOGUE, PassConfig, RewriteContext, RewriteRule, Transform};
use luaclear_analysis::{Metrics, collect_metrics};
use luaclear_core::rename::RenameMap;
use luaclear_core::{
    DecodeSkip, IdentKind, SourceBuffer, SourceInfo, SourceType, catalog, decoder, formatter,
};
use luaclear_utils::errors::{DeobfuscateError, PolishError};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// Configuration for the deobfuscation pipeline
#[derive(Debug, Clone)]
pub struct DeobfuscationConfig {
    /// Prefix for synthetic local-variable names (`var` → `var_1`)
    pub variable_prefix: String,
    /// Prefix for synthetic function names (`func` → `func_1`)
    pub function_prefix: String,
    /// Rewrite rules to apply, in catalogue order
    pub rules: Vec<&'static RewriteRule>,
    /// Pass configuration for rule behavior and formatting
    pub pass_config: PassConfig,
}

impl Default for DeobfuscationConfig {
    fn default() -> Self {
        Self {
            variable_prefix: IdentKind::Variable.default_prefix().to_string(),
            function_prefix: IdentKind::Function.default_prefix().to_string(),
            rules: CATALOGUE.to_vec(),
            pass_config: PassConfig::default(),
        }
    }
}

impl DeobfuscationConfig {
    fn validate(&self) -> Result<(), DeobfuscateError> {
        if self.variable_prefix == self.function_prefix {
            return Err(DeobfuscateError::InvalidConfig(format!(
                "variable and function prefixes are both `{}`",
                self.variable_prefix
            )));
        }
        if let Some(ratio) = self.pass_config.max_size_delta {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(DeobfuscateError::InvalidConfig(format!(
                    "max size delta must be a non-negative ratio, got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

/// Result of the deobfuscation pipeline
#[derive(Debug, Clone, Serialize)]
pub struct DeobfuscationResult {
    /// The formatted, newline-terminated output text
    pub output: String,
    /// Input size and fingerprint
    pub source: SourceInfo,
    /// Output size in bytes
    pub output_size: usize,
    /// Variable renames applied, in numbering order
    pub variables: RenameMap,
    /// Function renames applied, in numbering order
    pub functions: RenameMap,
    /// Metadata about the deobfuscation process
    pub metadata: DeobfuscationMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeobfuscationMetadata {
    /// Names of rules whose output was kept
    pub rules_applied: Vec<String>,
    /// Per-rule outcome in run order
    pub rule_outcomes: Vec<RuleOutcome>,
    /// Encoded-literal calls replaced
    pub literals_decoded: usize,
    /// `\xHH` escapes replaced
    pub escapes_decoded: usize,
    /// Total rule replacements kept
    pub rewrites: usize,
    /// Fragments left verbatim, with the reason
    pub skips: Vec<DecodeSkip>,
    /// Block depth still open at the end of the output
    pub final_depth: usize,
    /// Closing keywords found at depth zero
    pub clamped_closes: usize,
    pub metrics_before: Metrics,
    pub metrics_after: Metrics,
}

/// Deobfuscates script text held in memory.
pub fn deobfuscate_source(
    text: &str,
    config: &DeobfuscationConfig,
) -> Result<DeobfuscationResult, DeobfuscateError> {
    let source = SourceBuffer::new(text);
    let info = source.info(SourceType::Inline);
    run_pipeline(source, info, config)
}

/// Reads and deobfuscates a script file. An unreadable file aborts before any stage runs.
pub fn deobfuscate_file(
    path: impl AsRef<Path>,
    config: &DeobfuscationConfig,
) -> Result<DeobfuscationResult, DeobfuscateError> {
    let (source, info) = SourceBuffer::load(path)?;
    run_pipeline(source, info, config)
}

/// Literal decode → catalog → rename variables → rename functions → rules → format.
fn run_pipeline(
    source: SourceBuffer,
    info: SourceInfo,
    config: &DeobfuscationConfig,
) -> Result<DeobfuscationResult, DeobfuscateError> {
    config.validate()?;

    tracing::debug!("Starting deobfuscation pipeline:");
    tracing::debug!("  Input size: {} bytes", info.byte_length);
    tracing::debug!("  Keccak-256: {}", info.keccak_hash);
    tracing::debug!("  Rules: {}", config.rules.len());

    let metrics_before = collect_metrics(source.as_str());

    // Step 1: Decode literals
    let decoded = decoder::decode_literals(&source);
    let mut skips = decoded.skips;

    // Step 2: Catalog declarations
    let catalog = catalog::find_identifiers(&decoded.buffer);

    // Step 3: Rename variables, then functions
    let variables = RenameMap::build(
        IdentKind::Variable,
        &config.variable_prefix,
        catalog.variable_names(),
    )?;
    // a name declared both ways keeps its variable name, so renaming the output again is a no-op
    let functions = RenameMap::build(
        IdentKind::Function,
        &config.function_prefix,
        catalog
            .function_names()
            .filter(|name| variables.get(name).is_none()),
    )?;
    let renamed = variables.apply(&decoded.buffer)?;
    let mut buffer = functions.apply(&renamed)?;
    tracing::debug!(
        "  Renamed {} variables, {} functions",
        variables.len(),
        functions.len()
    );

    // Step 4: Idiom rules
    let mut cx = RewriteContext::new(&config.pass_config);
    let passes: Vec<&dyn Transform> = config
        .rules
        .iter()
        .map(|rule| *rule as &dyn Transform)
        .collect();
    let rule_outcomes = pass::run(&mut buffer, &passes, &mut cx)?;
    skips.append(&mut cx.skips);

    // Step 5: Structural format
    let formatted = formatter::format_source(&buffer, config.pass_config.indent_width);
    let output = formatted.buffer.terminated();
    let metrics_after = collect_metrics(&output);

    tracing::debug!("  Output size: {} bytes", output.len());
    tracing::debug!("  Skipped fragments: {}", skips.len());

    Ok(DeobfuscationResult {
        output_size: output.len(),
        output,
        source: info,
        variables,
        functions,
        metadata: DeobfuscationMetadata {
            rules_applied: rule_outcomes
                .iter()
                .filter(|o| o.kept)
                .map(|o| o.rule.clone())
                .collect(),
            rule_outcomes,
            literals_decoded: decoded.calls_decoded,
            escapes_decoded: decoded.escapes_decoded,
            rewrites: cx.hits,
            skips,
            final_depth: formatted.final_depth,
            clamped_closes: formatted.clamped,
            metrics_before,
            metrics_after,
        },
    })
}

/// Hands the finished output to an external collaborator.
///
/// The result is untouched whatever happens; on error the caller still has `result.output`.
pub async fn polish(
    result: &DeobfuscationResult,
    polisher: &dyn Polisher,
) -> Result<String, PolishError> {
    tracing::debug!("Polishing output with `{}`", polisher.name());
    polisher.polish(&result.output).await
}

/// Prints a summary of the run
pub fn print_deobfuscation_analysis(result: &DeobfuscationResult) {
    let meta = &result.metadata;

    println!("Decode Analysis:");
    println!("Encoded literals decoded: {}", meta.literals_decoded);
    println!("Hex escapes decoded: {}", meta.escapes_decoded);
    println!(
        "Renamed: {} variables, {} functions",
        result.variables.len(),
        result.functions.len()
    );
    println!();

    println!("Rule Analysis:");
    println!(
        "Applied {} rules ({} rewrites): {:?}",
        meta.rules_applied.len(),
        meta.rewrites,
        meta.rules_applied
    );

    if !meta.skips.is_empty() {
        println!("Skipped {} fragments:", meta.skips.len());
        for skip in &meta.skips {
            println!("   → {skip}");
        }
    }
    if meta.final_depth > 0 || meta.clamped_closes > 0 {
        println!(
            "Unbalanced blocks: depth {} left open, {} closes clamped",
            meta.final_depth, meta.clamped_closes
        );
    }

    println!("✅ Deobfuscation complete");
    println!(
        "📉 Obscurity: {:.1} → {:.1}",
        meta.metrics_before.obscurity, meta.metrics_after.obscurity
    );
    println!(
        "📈 Size change: {} → {} bytes",
        result.source.byte_length, result.output_size
    );
    println!();
}

/// Creates a JSON report from a run
pub fn create_report(result: &DeobfuscationResult) -> serde_json::Value {
    let meta = &result.metadata;
    json!({
        "source": result.source,
        "output_bytes": result.output_size,
        "size_delta_bytes": (result.output_size as i64 - result.source.byte_length as i64),
        "variables": result.variables,
        "functions": result.functions,
        "rules_applied": meta.rules_applied,
        "rule_outcomes": meta.rule_outcomes,
        "literals_decoded": meta.literals_decoded,
        "escapes_decoded": meta.escapes_decoded,
        "rewrites": meta.rewrites,
        "skips": meta.skips,
        "final_depth": meta.final_depth,
        "clamped_closes": meta.clamped_closes,
        "metrics_before": meta.metrics_before,
        "metrics_after": meta.metrics_after,
        "notes": if meta.skips.is_empty() {
            "Every recognised fragment was decoded"
        } else {
            "Some fragments could not be decoded and were kept verbatim"
        }
    })
}

/// Convenience function to create common pipeline configurations
pub mod presets {
    use super::*;
    use crate::{folding, loadstring, normalize, tables, unroll};

    /// Every rule in the catalogue
    pub fn full() -> DeobfuscationConfig {
        DeobfuscationConfig::default()
    }

    /// Decode and rename, then format; no idiom rules
    pub fn rename_only() -> DeobfuscationConfig {
        DeobfuscationConfig {
            rules: Vec::new(),
            ..DeobfuscationConfig::default()
        }
    }

    /// Every rule except those that erase headers, so parameter lists and conditions survive
    pub fn readable(max_unroll: Option<u64>) -> DeobfuscationConfig {
        DeobfuscationConfig {
            rules: vec![
                &normalize::BRACKET_SPACING,
                &folding::CHAR_CODES,
                &folding::INTEGER_ARITHMETIC,
                &tables::NUMERIC_TABLE_KEYS,
                &tables::STRING_INDEX,
                &folding::STRING_CONCAT,
                &unroll::RANGE_UNROLL,
                &loadstring::LOADSTRING,
                &normalize::TRAILING_WHITESPACE,
            ],
            pass_config: PassConfig {
                max_unroll,
                ..PassConfig::default()
            },
            ..DeobfuscationConfig::default()
        }
    }
}

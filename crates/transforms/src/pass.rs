use crate::util::{PassConfig, RewriteContext, Transform};
use luaclear_analysis::{collect_metrics, compare};
use luaclear_core::{DecodeSkip, SourceBuffer};
use luaclear_utils::errors::{DecodeError, TransformError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What one rule did during a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: String,
    /// replacements the rule made (zero when its output was discarded)
    pub hits: usize,
    /// readability change reported by the metrics (positive is better)
    pub delta: f64,
    /// whether the rule's output was kept
    pub kept: bool,
}

/// Trait for running an ordered sequence of transforms over a script.
pub trait Pass {
    fn run(
        &self,
        source: &mut SourceBuffer,
        passes: &[&dyn Transform],
        cx: &mut RewriteContext<'_>,
    ) -> Result<Vec<RuleOutcome>, TransformError>;
}

/// Default implementation of the Pass trait.
///
/// Every transform runs on a snapshot. The snapshot replaces the buffer unless the transform grew
/// it past [`PassConfig::max_size_delta`], in which case the transform's output is dropped and a
/// skip is recorded instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPass;

impl Pass for DefaultPass {
    fn run(
        &self,
        source: &mut SourceBuffer,
        passes: &[&dyn Transform],
        cx: &mut RewriteContext<'_>,
    ) -> Result<Vec<RuleOutcome>, TransformError> {
        let mut outcomes = Vec::with_capacity(passes.len());

        for pass in passes {
            let before = collect_metrics(source.as_str());
            let mut snapshot = source.clone();
            let hits_before = cx.hits;

            let mutated = pass.apply(&mut snapshot, cx)?;
            if !mutated {
                outcomes.push(RuleOutcome {
                    rule: pass.name().to_string(),
                    hits: 0,
                    delta: 0.0,
                    kept: false,
                });
                continue;
            }

            let after = collect_metrics(snapshot.as_str());
            let delta = compare(&before, &after);

            let keep = within_size_limit(cx.config, before.byte_len, after.byte_len);
            info!(
                "{:>20} Δ{:+.2} {}",
                pass.name(),
                delta,
                if keep { "✓" } else { "×" }
            );

            let hits = cx.hits - hits_before;
            if keep {
                *source = snapshot;
            } else {
                cx.hits = hits_before;
                cx.skips.push(DecodeSkip::new(
                    pass.name(),
                    source.as_str(),
                    &DecodeError::SizeLimit {
                        before: before.byte_len,
                        after: after.byte_len,
                    },
                ));
            }

            outcomes.push(RuleOutcome {
                rule: pass.name().to_string(),
                hits: if keep { hits } else { 0 },
                delta,
                kept: keep,
            });
        }
        Ok(outcomes)
    }
}

/// Whether growing from `before` to `after` bytes stays within the configured ratio.
fn within_size_limit(config: &PassConfig, before: usize, after: usize) -> bool {
    match config.max_size_delta {
        Some(ratio) => {
            let max_allowed = (before as f32 * (1.0 + ratio)).ceil() as usize;
            after <= max_allowed
        }
        None => true,
    }
}

/// Convenience function to run the default pass.
pub fn run(
    source: &mut SourceBuffer,
    passes: &[&dyn Transform],
    cx: &mut RewriteContext<'_>,
) -> Result<Vec<RuleOutcome>, TransformError> {
    DefaultPass.run(source, passes, cx)
}

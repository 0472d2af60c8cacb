use async_trait::async_trait;
use clap::Args;
use luaclear_core::SourceBuffer;
use luaclear_core::formatter::format_source;
use std::error::Error;

#[derive(Args)]
pub struct FormatArgs {
    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,
}

#[async_trait]
impl super::Command for FormatArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let (source, _) = SourceBuffer::load(input)?;
        let formatted = format_source(&source, self.indent);

        print!("{}", formatted.buffer.terminated());
        if formatted.final_depth > 0 || formatted.clamped > 0 {
            tracing::warn!(
                "unbalanced blocks: depth {} left open, {} closes clamped",
                formatted.final_depth,
                formatted.clamped
            );
        }
        Ok(())
    }
}

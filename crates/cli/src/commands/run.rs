/// Module for the `run` subcommand, which applies the full deobfuscation pipeline to a script.
///
/// This module reads the input script, decodes literals, renames declarations, applies the
/// selected rewrite rules, re-indents the result and writes it next to the input. It can also
/// emit a JSON run report and hand the output to an external polish command.
use async_trait::async_trait;
use clap::Args;
use luaclear_core::SourceBuffer;
use luaclear_transform::deobfuscator::{
    DeobfuscationConfig, create_report, deobfuscate_file, polish, print_deobfuscation_analysis,
};
use luaclear_transform::polish::CommandPolisher;
use luaclear_transform::{CATALOGUE, PassConfig, rules_from_names};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the `run` subcommand.
#[derive(Args)]
pub struct RunArgs {
    /// Output path (defaults to `<stem>_deobfuscated.lua` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated rewrite rules to apply (defaults to every rule)
    #[arg(long, value_delimiter = ',')]
    rules: Option<Vec<String>>,

    /// Prefix for synthetic variable names
    #[arg(long, default_value = "var")]
    var_prefix: String,

    /// Prefix for synthetic function names
    #[arg(long, default_value = "func")]
    func_prefix: String,

    /// Skip unrolling loops with more iterations than this
    #[arg(long)]
    max_unroll: Option<u64>,

    /// Discard a rule's output if it grows the script by more than this ratio (e.g. 0.5)
    #[arg(long)]
    max_size_delta: Option<f32>,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Path to write a JSON run report
    #[arg(long)]
    emit: Option<PathBuf>,

    /// Command that reads a prompt on stdin and prints polished code on stdout
    #[arg(long)]
    polish_cmd: Option<String>,

    /// Where to write polished output (defaults to `<stem>_polished.lua` next to the input)
    #[arg(long)]
    polish_output: Option<PathBuf>,
}

#[async_trait]
impl super::Command for RunArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let rules = match &self.rules {
            Some(names) => rules_from_names(names.as_slice())?,
            None => CATALOGUE.to_vec(),
        };
        let config = DeobfuscationConfig {
            variable_prefix: self.var_prefix,
            function_prefix: self.func_prefix,
            rules,
            pass_config: PassConfig {
                max_unroll: self.max_unroll,
                max_size_delta: self.max_size_delta,
                indent_width: self.indent,
            },
        };

        let result = deobfuscate_file(input, &config)?;
        print_deobfuscation_analysis(&result);

        let output = self
            .output
            .unwrap_or_else(|| sibling_path(Path::new(input), "deobfuscated"));
        SourceBuffer::new(result.output.as_str()).persist(&output)?;
        println!("💾 Wrote deobfuscated script to {}", output.display());

        if let Some(path) = self.emit {
            let report = create_report(&result);
            fs::write(&path, serde_json::to_string_pretty(&report)?)?;
            println!("📊 Wrote run report to {}", path.display());
        }

        if let Some(line) = self.polish_cmd {
            let polisher = CommandPolisher::from_command_line(&line)
                .ok_or("--polish-cmd must name a program")?;
            let polished = polish(&result, &polisher).await.map_err(|e| {
                tracing::error!("polish with `{}` failed: {}", line, e);
                e
            })?;
            let path = self
                .polish_output
                .unwrap_or_else(|| sibling_path(Path::new(input), "polished"));
            SourceBuffer::new(polished).persist(&path)?;
            println!("✨ Wrote polished script to {}", path.display());
        }
        Ok(())
    }
}

/// `dir/name.lua` → `dir/name_<suffix>.lua`.
pub fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());
    input.with_file_name(format!("{stem}_{suffix}.lua"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling_path(Path::new("dir/obf.lua"), "deobfuscated"),
            PathBuf::from("dir/obf_deobfuscated.lua")
        );
        assert_eq!(
            sibling_path(Path::new("script.txt"), "polished"),
            PathBuf::from("script_polished.lua")
        );
    }
}

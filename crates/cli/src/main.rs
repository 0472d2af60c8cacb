/// Entry point for the luaclear CLI, a Lua script deobfuscator.
///
/// This module parses command-line arguments and dispatches to subcommands for running the full
/// pipeline, decoding literals, re-indenting, or listing declarations. It initializes logging
/// and handles the main execution flow.
use clap::Parser;
use luaclear_cli::commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

/// Command-line interface for luaclear.
///
/// luaclear undoes common Lua obfuscation: it decodes encoded literals, renames declared
/// identifiers to stable synthetic names, folds known idioms (character codes, integer
/// arithmetic, string concatenation, literal-range loops) and re-indents the result.
#[derive(Parser)]
#[command(name = "luaclear")]
#[command(about = "luaclear: Lua script deobfuscator")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Path of the Lua script to process
    input: String,
}

/// Runs the luaclear CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute(&cli.input).await
}

use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;

pub mod catalog;
pub mod decode;
pub mod format;
pub mod run;

#[derive(Subcommand)]
pub enum Cmd {
    /// Run the full pipeline and write the deobfuscated script
    Run(run::RunArgs),

    /// Decode encoded literals and hex escapes, print the result
    Decode(decode::DecodeArgs),

    /// Re-indent the script from its block keywords, print the result
    Format(format::FormatArgs),

    /// List local-variable and function declarations
    Catalog(catalog::CatalogArgs),
}

#[async_trait]
pub trait Command {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Run(args) => args.execute(input).await,
            Cmd::Decode(args) => args.execute(input).await,
            Cmd::Format(args) => args.execute(input).await,
            Cmd::Catalog(args) => args.execute(input).await,
        }
    }
}

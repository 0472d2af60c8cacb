use async_trait::async_trait;
use clap::Args;
use luaclear_core::SourceBuffer;
use luaclear_core::catalog::find_identifiers;
use std::error::Error;

#[derive(Args)]
pub struct CatalogArgs {
    /// Print the catalog as JSON instead of one declaration per line
    #[arg(long)]
    json: bool,
}

#[async_trait]
impl super::Command for CatalogArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let (source, _) = SourceBuffer::load(input)?;
        let catalog = find_identifiers(&source);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        } else {
            for ident in catalog.variables.iter().chain(&catalog.functions) {
                println!("{:<8} {} @{}", ident.kind.to_string(), ident.name, ident.offset);
            }
        }
        Ok(())
    }
}

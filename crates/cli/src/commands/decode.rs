/// Module for the `decode` subcommand, which runs only the literal decoder.
///
/// Encoded-literal calls and `\xHH` escapes are replaced and the result is printed; payloads that
/// fail to decode stay verbatim and are listed on stderr.
use async_trait::async_trait;
use clap::Args;
use luaclear_core::SourceBuffer;
use luaclear_core::decoder::decode_literals;
use std::error::Error;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub struct DecodeArgs;

#[async_trait]
impl super::Command for DecodeArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let (source, _) = SourceBuffer::load(input)?;
        let decoded = decode_literals(&source);

        print!("{}", decoded.buffer.terminated());
        for skip in &decoded.skips {
            eprintln!("skipped {skip}");
        }
        Ok(())
    }
}

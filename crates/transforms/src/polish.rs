//! Optional final rewrite by an external text-completion collaborator.
//!
//! The deterministic pipeline never depends on this step. A [`Polisher`] receives the finished
//! output and returns replacement text; failure is reported to the caller, who still holds the
//! pipeline output.

use async_trait::async_trait;
use luaclear_utils::errors::PolishError;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Instruction sent ahead of the script text.
pub const PROMPT_PREAMBLE: &str = "The following Lua script was produced by an automatic \
deobfuscator. Rename its variables and functions to meaningful names and fix its spacing. \
Reply with the changed code only and no other words.";

/// Builds the full request payload for `text`.
pub fn prompt(text: &str) -> String {
    format!("{PROMPT_PREAMBLE}\n\n{text}")
}

/// Text → text rewriting collaborator.
#[async_trait]
pub trait Polisher: Send + Sync {
    fn name(&self) -> &str;
    async fn polish(&self, text: &str) -> Result<String, PolishError>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPolisher;

#[async_trait]
impl Polisher for NoopPolisher {
    fn name(&self) -> &str {
        "noop"
    }

    async fn polish(&self, text: &str) -> Result<String, PolishError> {
        Ok(text.to_string())
    }
}

/// Runs an external program once, writing the prompt to its stdin and taking its stdout as the
/// polished text. No retry.
#[derive(Debug, Clone)]
pub struct CommandPolisher {
    program: String,
    args: Vec<String>,
}

impl CommandPolisher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace: first word is the program, the rest are arguments.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }
}

#[async_trait]
impl Polisher for CommandPolisher {
    fn name(&self) -> &str {
        &self.program
    }

    async fn polish(&self, text: &str) -> Result<String, PolishError> {
        debug!("polishing {} bytes with `{}`", text.len(), self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(PolishError::Spawn)?;

        // stdout is drained while stdin is still being written, so a collaborator that echoes
        // its input cannot fill the pipe and stall both sides.
        let stdin = child.stdin.take();
        let payload = prompt(text);
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(payload.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            return Err(PolishError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // a program may answer without reading all of its input
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }

        let polished = String::from_utf8(output.stdout).map_err(|_| PolishError::Utf8)?;
        if polished.trim().is_empty() {
            return Err(PolishError::EmptyResponse);
        }
        Ok(polished)
    }
}

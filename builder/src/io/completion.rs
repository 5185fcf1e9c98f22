//! Generation-service boundary.
//!
//! The [`Completion`] trait is the pipeline's sole external dependency:
//! every stage differs only in the prompt and options it passes, never in
//! contract shape. Tests use scripted completions that return predetermined
//! text without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::io::process::run_command_with_timeout;

/// One outbound request to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Abstraction over text-completion backends.
pub trait Completion {
    /// Produce completion text for the request. Errors here are transport
    /// failures; the stage boundary converts them to typed failure values.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Completion backend that spawns a configurable external CLI.
///
/// The prompt is fed on stdin and the completion read from stdout.
/// Generation options travel as environment variables
/// (`BUILDER_TEMPERATURE`, `BUILDER_MAX_OUTPUT_TOKENS`) so wrapper scripts
/// can forward them to whatever backend they front.
#[derive(Debug, Clone)]
pub struct CommandCompletion {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandCompletion {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            command,
            timeout,
            output_limit_bytes,
        }
    }
}

impl Completion for CommandCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let program = self
            .command
            .first()
            .ok_or_else(|| anyhow!("completion command is empty"))?;
        info!(
            program = %program,
            prompt_bytes = request.prompt.len(),
            temperature = request.temperature,
            "calling generation command"
        );

        let mut cmd = Command::new(program);
        cmd.args(&self.command[1..])
            .env("BUILDER_TEMPERATURE", format!("{}", request.temperature))
            .env(
                "BUILDER_MAX_OUTPUT_TOKENS",
                request.max_output_tokens.to_string(),
            );

        let output = run_command_with_timeout(
            cmd,
            Some(request.prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "generation command timed out");
            return Err(anyhow!(
                "generation command timed out after {:?}",
                self.timeout
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generation command failed");
            return Err(anyhow!(
                "generation command failed with status {:?}: {}",
                output.status.code(),
                output.stderr_excerpt(400)
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(response_bytes = text.len(), "generation command completed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn command_completion_pipes_prompt_through() {
        let completion = CommandCompletion::new(
            vec!["cat".to_string()],
            Duration::from_secs(5),
            10_000,
        );
        let text = completion
            .complete(&CompletionRequest {
                prompt: "echo me".to_string(),
                temperature: 0.4,
                max_output_tokens: 64,
            })
            .expect("complete");
        assert_eq!(text, "echo me");
    }

    #[cfg(unix)]
    #[test]
    fn command_completion_exposes_options_as_env() {
        let completion = CommandCompletion::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "printf '%s %s' \"$BUILDER_TEMPERATURE\" \"$BUILDER_MAX_OUTPUT_TOKENS\"".to_string(),
            ],
            Duration::from_secs(5),
            10_000,
        );
        let text = completion
            .complete(&CompletionRequest {
                prompt: String::new(),
                temperature: 0.1,
                max_output_tokens: 2048,
            })
            .expect("complete");
        assert_eq!(text, "0.1 2048");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_error() {
        let completion = CommandCompletion::new(
            vec!["false".to_string()],
            Duration::from_secs(5),
            10_000,
        );
        let err = completion
            .complete(&CompletionRequest {
                prompt: "p".to_string(),
                temperature: 0.4,
                max_output_tokens: 64,
            })
            .unwrap_err();
        assert!(err.to_string().contains("failed with status"));
    }

    #[test]
    fn empty_command_is_an_error() {
        let completion = CommandCompletion::new(Vec::new(), Duration::from_secs(1), 1024);
        let err = completion
            .complete(&CompletionRequest {
                prompt: "p".to_string(),
                temperature: 0.4,
                max_output_tokens: 64,
            })
            .unwrap_err();
        assert!(err.to_string().contains("command is empty"));
    }
}

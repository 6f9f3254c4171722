use crate::ai::Summarizer;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Variables stripped from the child environment so the CLI uses its own login
const REDACTED_ENV_VARS: &[&str] = &["ANTHROPIC_API_KEY"];

/// Summarizer backed by the `claude` command-line tool
pub struct ClaudeCli {
    program: String,
}

impl ClaudeCli {
    /// Create a summarizer that runs `<program> -p <prompt>`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Copy of `vars` without the redacted secrets
pub fn redacted_env<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(key, _)| !REDACTED_ENV_VARS.contains(&key.as_str()))
        .collect()
}

#[async_trait]
impl Summarizer for ClaudeCli {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        info!(program = %self.program, prompt_bytes = prompt.len(), "Running summarizer");

        let output = Command::new(&self.program)
            .arg("-p")
            .arg(prompt)
            .env_clear()
            .envs(redacted_env(std::env::vars()))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RecapError::summarizer(format!("failed to start '{}': {}", self.program, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(RecapError::summarizer(format!(
                "{} CLI failed (exit {})\nstderr: {}\nstdout: {}",
                self.program, code, stderr, stdout
            )));
        }

        debug!(output_bytes = stdout.len(), "Summarizer finished");
        Ok(stdout.trim().to_string())
    }
}

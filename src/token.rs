use crate::config::Config;
use crate::error::{RecapError, Result};
use std::process::Command;
use tracing::debug;

const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolve a GitHub token from the environment, the config file, or the GitHub CLI
pub fn resolve_github_token(config: &Config) -> Result<String> {
    let from_env = TOKEN_ENV_VARS
        .iter()
        .map(|name| std::env::var(name).ok());
    let candidates = from_env.chain(std::iter::once(config.github_token.clone()));

    first_token(candidates)
        .or_else(gh_cli_token)
        .ok_or(RecapError::MissingToken)
}

/// First non-blank candidate
fn first_token<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

/// Ask `gh auth token`; any failure just means no token
fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        debug!(status = ?output.status.code(), "gh auth token failed");
        return None;
    }

    let token = String::from_utf8(output.stdout).ok()?;
    first_token([Some(token)])
}

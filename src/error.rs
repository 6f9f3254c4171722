use thiserror::Error;

/// Main error type for gh-recap
#[derive(Error, Debug)]
pub enum RecapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Transport-level HTTP errors (connection refused, TLS, timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from GitHub that is not a recoverable rate limit
    #[error("GitHub API error {status}: {body}")]
    GitHubApi { status: u16, body: String },

    /// Rate-limit waiting exceeded the configured bounds
    #[error("GitHub rate limit still exhausted after {attempts} retries (next wait {wait_secs}s)")]
    RateLimitExceeded { attempts: u32, wait_secs: u64 },

    /// External summarizer failures
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// Caching errors
    #[error("Cache error: {0}")]
    Cache(#[from] sled::Error),

    /// No GitHub token could be found
    #[error(
        "No GitHub token found. Either:\n  \
         - Set GITHUB_TOKEN or GH_TOKEN environment variable, or\n  \
         - Add github_token to the config file, or\n  \
         - Install the GitHub CLI (gh) and run: gh auth login"
    )]
    MissingToken,

    /// Invalid date range
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// The caller cancelled an in-flight fetch
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for gh-recap operations
pub type Result<T> = std::result::Result<T, RecapError>;

impl RecapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new summarizer error
    pub fn summarizer<S: Into<String>>(msg: S) -> Self {
        Self::Summarizer(msg.into())
    }

    /// Create a new date range error
    pub fn date_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDateRange(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status_and_body() {
        let err = RecapError::GitHubApi {
            status: 422,
            body: "{\"message\":\"Validation Failed\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("Validation Failed"));
    }
}

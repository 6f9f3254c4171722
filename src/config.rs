use crate::ai::prompt::find_preset;
use crate::error::{RecapError, Result};
use crate::github::DateRange;
use chrono::{Duration, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Time period covered by a recap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
    Custom,
}

impl Period {
    /// Phrase used when describing the period in a prompt
    pub fn describe(&self) -> String {
        match self {
            Period::Custom => "a custom period".to_string(),
            other => format!("the past {}", other.name()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
            Period::Custom => "custom",
        }
    }
}

/// What the recap produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured text report only
    Text,
    /// AI summary only
    Summary,
    /// Both
    Both,
}

impl OutputFormat {
    pub fn includes_text(&self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_summary(&self) -> bool {
        matches!(self, OutputFormat::Summary | OutputFormat::Both)
    }
}

/// Resolve a period into concrete dates ending `today`
pub fn resolve_date_range(
    period: Period,
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange> {
    let start = match period {
        Period::Custom => {
            return match (since, until) {
                (Some(since), Some(until)) => DateRange::new(since, until),
                _ => Err(RecapError::date_range(
                    "--since and --until are required with --period custom",
                )),
            };
        }
        Period::Week => Some(today - Duration::days(7)),
        Period::Month => today.checked_sub_months(Months::new(1)),
        Period::Quarter => today.checked_sub_months(Months::new(3)),
        Period::Year => today.checked_sub_months(Months::new(12)),
    };

    let start = start.ok_or_else(|| RecapError::date_range("period start is out of range"))?;
    DateRange::new(start, today)
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub token (env vars and `gh auth token` are also consulted)
    pub github_token: Option<String>,

    /// Username to recap when none is given (default: token owner)
    pub default_username: Option<String>,

    /// Organization filter applied when none is given
    pub default_org: Option<String>,

    /// Default period (default: week)
    #[serde(default = "default_period")]
    pub default_period: Period,

    /// Default output format (default: both)
    #[serde(default = "default_format")]
    pub default_format: OutputFormat,

    /// Prompt preset used for AI summaries
    #[serde(default = "default_prompt_preset")]
    pub prompt_preset: String,

    /// Command invoked as `<command> -p <prompt>` to produce summaries
    #[serde(default = "default_summarizer_command")]
    pub summarizer_command: String,

    /// GitHub API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum rate-limit retries per request (None = wait indefinitely)
    pub max_rate_limit_retries: Option<u32>,

    /// Longest acceptable single rate-limit wait in seconds (None = unbounded)
    pub max_rate_limit_wait_secs: Option<u64>,

    /// Enable caching of AI summaries
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Cache TTL in hours (default: 168 hours / 7 days)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_hours: u32,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecapError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RecapError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("gh-recap").join("config.toml"))
    }

    /// Get the default cache directory path
    pub fn default_cache_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RecapError::config("Could not determine home directory"))?;
        Ok(home.join(".cache").join("gh-recap"))
    }

    /// Write a default configuration file at `path`
    pub fn create_default_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(RecapError::config("api_base_url must not be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(RecapError::config("request_timeout_secs must be > 0"));
        }

        if self.cache_ttl_hours == 0 {
            return Err(RecapError::config("cache_ttl_hours must be > 0"));
        }

        if self.summarizer_command.trim().is_empty() {
            return Err(RecapError::config("summarizer_command must not be empty"));
        }

        if find_preset(&self.prompt_preset).is_none() {
            return Err(RecapError::config(format!(
                "Unknown prompt_preset '{}' (run `gh-recap presets` to list them)",
                self.prompt_preset
            )));
        }

        Ok(())
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            info!(path = %config_path.display(), "Config file not found, creating default");
            return Self::create_default_at(&config_path);
        }
        Self::load_from(&config_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            default_username: None,
            default_org: None,
            default_period: default_period(),
            default_format: default_format(),
            prompt_preset: default_prompt_preset(),
            summarizer_command: default_summarizer_command(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_rate_limit_retries: None,
            max_rate_limit_wait_secs: None,
            cache_enabled: default_true(),
            cache_ttl_hours: default_cache_ttl(),
        }
    }
}

// Serde default functions
fn default_period() -> Period {
    Period::Week
}

fn default_format() -> OutputFormat {
    OutputFormat::Both
}

fn default_prompt_preset() -> String {
    "unbiased".to_string()
}

fn default_summarizer_command() -> String {
    "claude".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u32 {
    168 // 7 days in hours
}

fn default_true() -> bool {
    true
}

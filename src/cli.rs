use crate::config::{OutputFormat, Period};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gh-recap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Recap your GitHub activity for a time period",
    long_about = "gh-recap collects the pull requests you opened, reviewed and commented on, \
                  plus the commits you authored, over a time period. It prints a structured \
                  report and can hand it to an AI assistant for a narrative review."
)]
pub struct Cli {
    /// Time period to cover
    #[arg(short, long, value_enum)]
    pub period: Option<Period>,

    /// Start date (YYYY-MM-DD) for a custom period
    #[arg(short, long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// End date (YYYY-MM-DD) for a custom period
    #[arg(short, long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// What to produce
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// GitHub username (default: owner of the token)
    #[arg(long)]
    pub username: Option<String>,

    /// Only include activity in repositories of this organization
    #[arg(short, long)]
    pub org: Option<String>,

    /// Prompt preset name (see `presets`) or custom instructions for the AI summary
    #[arg(long)]
    pub prompt: Option<String>,

    /// Run in interactive mode
    #[arg(short, long)]
    pub interactive: bool,

    /// Path to config file (default: ~/.config/gh-recap/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable the AI summary cache
    #[arg(long)]
    pub no_cache: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,

    /// List the built-in prompt presets
    Presets,

    /// Clear the summary cache
    ClearCache,

    /// Show summary cache statistics
    CacheStats,
}

impl Cli {
    /// Period to use, treating an explicit `--since`/`--until` pair as custom
    pub fn effective_period(&self) -> Option<Period> {
        match self.period {
            Some(period) => Some(period),
            None if self.since.is_some() && self.until.is_some() => Some(Period::Custom),
            None => None,
        }
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        let period = self.effective_period();

        if period == Some(Period::Custom) && (self.since.is_none() || self.until.is_none()) {
            return Err("--since and --until are required with --period custom".to_string());
        }

        if period != Some(Period::Custom) && (self.since.is_some() || self.until.is_some()) {
            return Err(
                "--since/--until only apply to a custom period. Pass both, or use --period custom."
                    .to_string(),
            );
        }

        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(format!("--since {} is after --until {}", since, until));
            }
        }

        Ok(())
    }
}

/// Interactive mode runs with no arguments at all, or when asked for explicitly
pub fn should_run_interactive(args: &[String]) -> bool {
    args.is_empty() || args.iter().any(|a| a == "-i" || a == "--interactive")
}

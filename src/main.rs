mod ai;
mod cli;
mod config;
mod error;
mod github;
mod interactive;
mod orchestrator;
mod report;
mod token;

use ai::cache::SummaryCache;
use ai::prompt::PROMPT_PRESETS;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use config::{resolve_date_range, Config, OutputFormat, Period};
use error::{RecapError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{Orchestrator, RecapRequest};
use std::env;
use std::io;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Options for one recap run, from flags or interactive prompts
struct RunOptions {
    period: Period,
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    format: OutputFormat,
    username: Option<String>,
    org: Option<String>,
}

#[tokio::main]
async fn main() {
    let raw_args: Vec<String> = env::args().skip(1).collect();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli, &raw_args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gh_recap={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, raw_args: &[String]) -> Result<()> {
    cli.validate().map_err(RecapError::config)?;

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, &cli);
    }

    let config = load_config(&cli)?;
    let config = apply_cli_overrides(config, &cli);
    config.validate()?;

    let options = if cli::should_run_interactive(raw_args) {
        interactive_options(&config)?
    } else {
        cli_options(&cli, &config)
    };

    let today = Utc::now().date_naive();
    let date_range = resolve_date_range(options.period, options.since, options.until, today)?;

    let request = RecapRequest {
        username: options.username,
        date_range,
        period: options.period,
        org: options.org,
        format: options.format,
        prompt: cli.prompt.clone(),
    };

    let token = token::resolve_github_token(&config)?;
    let orchestrator = Orchestrator::new(config, token)?;

    let spinner = start_spinner(&format!("Building GitHub recap for {}...", date_range));
    let result = orchestrator.recap(&request, ctrl_c()).await;
    spinner.finish_and_clear();
    let result = result?;

    debug!(
        prs_created = result.data.prs_created.len(),
        commits = result.data.commits.len(),
        "Recap complete"
    );

    if let Some(text) = &result.text {
        println!("{}", text);
    }

    if let Some(summary) = &result.summary {
        if result.text.is_some() {
            println!("\n{}\n", "=".repeat(60));
        }
        println!("{}", summary.render());
    }

    Ok(())
}

/// Resolves once Ctrl-C is pressed; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(config_path) => Config::load_from(config_path),
        None => Config::load_or_create_default(),
    }
}

fn cli_options(cli: &Cli, config: &Config) -> RunOptions {
    RunOptions {
        period: cli.effective_period().unwrap_or(config.default_period),
        since: cli.since,
        until: cli.until,
        format: cli.format.unwrap_or(config.default_format),
        username: cli.username.clone(),
        org: cli.org.clone(),
    }
}

fn interactive_options(config: &Config) -> Result<RunOptions> {
    println!("gh-recap v{}\n", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let answers = interactive::prompt_for_options(&mut input, &mut output, config)?;
    println!();

    Ok(RunOptions {
        period: answers.period,
        since: answers.since,
        until: answers.until,
        format: answers.format,
        username: answers.username,
        org: answers.org,
    })
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Init { force } => {
            let config_path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::default_config_path()?,
            };

            if config_path.exists() && !force {
                return Err(RecapError::config(format!(
                    "Config file already exists at: {} (use --force to overwrite)",
                    config_path.display()
                )));
            }

            Config::create_default_at(&config_path)?;
            println!("✓ Created config file at: {}", config_path.display());
            println!("\nTo authenticate with GitHub, either:");
            println!("  1. Set the GITHUB_TOKEN or GH_TOKEN environment variable");
            println!("  2. Add github_token to the config file:");
            println!("     github_token = \"ghp_YOUR_TOKEN_HERE\"");
            println!("  3. Log in with the GitHub CLI: gh auth login");
        }
        Commands::Config => {
            let mut config = load_config(cli)?;
            if config.github_token.is_some() {
                config.github_token = Some("<redacted>".to_string());
            }
            let toml_str = toml::to_string_pretty(&config)?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
        Commands::Presets => {
            let config = load_config(cli)?;
            println!("Prompt presets (use with --prompt <value>):\n");
            for preset in PROMPT_PRESETS {
                let marker = if preset.value == config.prompt_preset {
                    " (default)"
                } else {
                    ""
                };
                println!("  {:<10} {}{}", preset.value, preset.name, marker);
            }
        }
        Commands::ClearCache => {
            let cache_dir = Config::default_cache_dir()?;
            if cache_dir.exists() {
                let removed = SummaryCache::open(&cache_dir, 0)?.clear()?;
                println!(
                    "✓ Cache cleared: {} ({} entries removed)",
                    cache_dir.display(),
                    removed
                );
            } else {
                println!("Cache directory does not exist");
            }
        }
        Commands::CacheStats => {
            let cache_dir = Config::default_cache_dir()?;
            if !cache_dir.exists() {
                println!("Cache directory does not exist");
            } else {
                println!("Cache directory: {}", cache_dir.display());

                match SummaryCache::open(&cache_dir, 0) {
                    Ok(cache) => {
                        let stats = cache.stats();
                        println!("Total entries: {}", stats.entries);
                        println!("Database size: {}", stats.human_size());
                    }
                    Err(_) => println!("Could not open cache database"),
                }
            }
        }
    }
    Ok(())
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    // Override cache setting
    if cli.no_cache {
        config.cache_enabled = false;
    }

    config
}

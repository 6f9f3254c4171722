use crate::config::{Config, OutputFormat, Period};
use crate::error::{RecapError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::io::{BufRead, Write};

/// Options gathered from the user in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveOptions {
    pub period: Period,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub format: OutputFormat,
    pub username: Option<String>,
    pub org: Option<String>,
}

/// Prompt for every recap option, using config values as defaults
pub fn prompt_for_options<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &Config,
) -> Result<InteractiveOptions> {
    let period = prompt_choice(
        input,
        output,
        "Time period",
        &[
            ("Past week", Period::Week),
            ("Past month", Period::Month),
            ("Past quarter", Period::Quarter),
            ("Past year", Period::Year),
            ("Custom date range", Period::Custom),
        ],
        config.default_period,
    )?;

    let (since, until) = if period == Period::Custom {
        let since = prompt_date(input, output, "Start date (YYYY-MM-DD)")?;
        let until = prompt_date(input, output, "End date (YYYY-MM-DD)")?;
        (Some(since), Some(until))
    } else {
        (None, None)
    };

    let format = prompt_choice(
        input,
        output,
        "Output format",
        &[
            ("Structured text", OutputFormat::Text),
            ("AI summary", OutputFormat::Summary),
            ("Both", OutputFormat::Both),
        ],
        config.default_format,
    )?;

    let username = prompt_optional(
        input,
        output,
        "GitHub username (leave empty for token owner)",
        config.default_username.as_deref(),
    )?;
    let org = prompt_optional(
        input,
        output,
        "Filter by organization (leave empty for all)",
        config.default_org.as_deref(),
    )?;

    Ok(InteractiveOptions {
        period,
        since,
        until,
        format,
        username,
        org,
    })
}

/// Read one trimmed line; EOF is an error so prompts cannot spin forever
fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(RecapError::config("unexpected end of input"));
    }
    Ok(line.trim().to_string())
}

/// Numbered menu; Enter accepts the default
fn prompt_choice<R: BufRead, W: Write, T: Copy + PartialEq>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    choices: &[(&str, T)],
    default: T,
) -> Result<T> {
    let default_index = choices
        .iter()
        .position(|(_, value)| *value == default)
        .unwrap_or(0);

    loop {
        writeln!(output, "{}:", prompt)?;
        for (i, (label, _)) in choices.iter().enumerate() {
            writeln!(output, "  {}. {}", i + 1, label)?;
        }
        write!(output, "Choice [{}]: ", default_index + 1)?;
        output.flush()?;

        let answer = read_line(input)?;
        if answer.is_empty() {
            return Ok(choices[default_index].1);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => return Ok(choices[n - 1].1),
            _ => writeln!(output, "Please enter a number between 1 and {}.", choices.len())?,
        }
    }
}

/// Required YYYY-MM-DD date
fn prompt_date<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<NaiveDate> {
    let pattern = Regex::new(r"^\d{4}-\d{2}-\d{2}$").map_err(|e| RecapError::config(e.to_string()))?;

    loop {
        write!(output, "{}: ", prompt)?;
        output.flush()?;

        let answer = read_line(input)?;
        if pattern.is_match(&answer) {
            if let Ok(date) = NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                return Ok(date);
            }
        }
        writeln!(output, "Please enter a valid date (YYYY-MM-DD)")?;
    }
}

/// Free-text answer; empty means "not set" unless a default exists
fn prompt_optional<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<&str>,
) -> Result<Option<String>> {
    match default {
        Some(default) => write!(output, "{} [{}]: ", prompt, default)?,
        None => write!(output, "{}: ", prompt)?,
    }
    output.flush()?;

    let answer = read_line(input)?;
    if answer.is_empty() {
        Ok(default.map(String::from))
    } else {
        Ok(Some(answer))
    }
}

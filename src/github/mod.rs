pub mod activity;
pub mod client;
pub mod mapper;
pub mod query;
pub mod search;

use crate::error::{RecapError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive calendar-date range, rendered as `since..until` in search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDateRange")]
pub struct DateRange {
    /// First day (inclusive)
    pub since: NaiveDate,
    /// Last day (inclusive)
    pub until: NaiveDate,
}

/// Wire form of [`DateRange`]; deserialization goes through [`DateRange::new`]
#[derive(Deserialize)]
struct UncheckedDateRange {
    since: NaiveDate,
    until: NaiveDate,
}

impl TryFrom<UncheckedDateRange> for DateRange {
    type Error = RecapError;

    fn try_from(raw: UncheckedDateRange) -> Result<Self> {
        DateRange::new(raw.since, raw.until)
    }
}

impl DateRange {
    /// Create a range, rejecting `since > until`
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self> {
        if since > until {
            return Err(RecapError::date_range(format!(
                "start date {} is after end date {}",
                since, until
            )));
        }
        Ok(Self { since, until })
    }

    /// Parse a range from two `YYYY-MM-DD` strings
    pub fn parse(since: &str, until: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| RecapError::date_range(format!("'{}' is not a YYYY-MM-DD date", s)))
        };
        Self::new(parse(since)?, parse(until)?)
    }

    /// Temporal midpoint, floored to a whole day
    pub fn midpoint(&self) -> NaiveDate {
        let days = (self.until - self.since).num_days();
        self.since + Duration::days(days / 2)
    }

    /// Split into `[since, mid]` and `[mid + 1, until]`.
    ///
    /// Returns `None` for a single-day range, which cannot be narrowed further.
    pub fn bisect(&self) -> Option<(DateRange, DateRange)> {
        if self.since == self.until {
            return None;
        }
        let mid = self.midpoint();
        let first = DateRange {
            since: self.since,
            until: mid,
        };
        let second = DateRange {
            since: mid + Duration::days(1),
            until: self.until,
        };
        Some((first, second))
    }

    /// Number of days covered, counting both ends
    pub fn num_days(&self) -> i64 {
        (self.until - self.since).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.since.format("%Y-%m-%d"),
            self.until.format("%Y-%m-%d")
        )
    }
}

/// Pull request state as reported by the search API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
        }
    }
}

/// A pull request found by one of the PR searches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub title: String,
    /// HTML URL, unique per PR
    pub url: String,
    /// "owner/name"
    pub repo: String,
    pub number: u64,
    pub state: PrState,
    pub merged: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub review_comment_count: Option<u32>,
}

impl PullRequest {
    /// Status tag used in reports: merged wins over the raw state
    pub fn status_label(&self) -> String {
        if self.merged {
            "merged".to_string()
        } else {
            self.state.to_string()
        }
    }
}

/// A commit authored by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// First line of the commit message
    pub message: String,
    pub sha: String,
    pub url: String,
    pub repo: String,
    pub date: DateTime<Utc>,
}

/// A PR the user commented on without authoring or reviewing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrComment {
    pub pr_title: String,
    pub pr_url: String,
    pub pr_number: u64,
    pub repo: String,
}

/// Everything fetched for one user over one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    pub source: String,
    pub date_range: DateRange,
    pub username: String,
    pub prs_created: Vec<PullRequest>,
    pub prs_reviewed: Vec<PullRequest>,
    pub commits: Vec<Commit>,
    pub pr_comments: Vec<PrComment>,
}

impl ActivityData {
    /// Number of distinct repositories that received commits
    pub fn commit_repo_count(&self) -> usize {
        self.commits
            .iter()
            .map(|c| c.repo.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

//! Conversion of raw search records into typed activity entities.
//!
//! Raw records never leave this module: each mapper deserializes the JSON item
//! into a private wire struct and builds the domain type from it.

use crate::error::Result;
use crate::github::{Commit, PrComment, PrState, PullRequest};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawIssue {
    title: String,
    html_url: String,
    number: u64,
    state: PrState,
    repository_url: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    pull_request: Option<RawPullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestRef {
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawCommitItem {
    sha: String,
    html_url: String,
    commit: RawCommitDetail,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    message: String,
    author: RawCommitAuthor,
}

#[derive(Debug, Deserialize)]
struct RawCommitAuthor {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    url: String,
}

/// Derive "owner/name" from a repository API URL such as
/// `https://api.github.com/repos/owner/name`
pub fn extract_repo(repository_url: &str) -> String {
    let mut segments = repository_url.trim_end_matches('/').rsplit('/');
    let name = segments.next().unwrap_or_default();
    let owner = segments.next().unwrap_or_default();
    format!("{}/{}", owner, name)
}

/// First line of a commit message
pub fn first_line(message: &str) -> &str {
    message.split('\n').next().unwrap_or_default()
}

pub fn map_pull_request(item: Value) -> Result<PullRequest> {
    let raw: RawIssue = serde_json::from_value(item)?;
    let merged_at = raw.pull_request.and_then(|pr| pr.merged_at);

    Ok(PullRequest {
        title: raw.title,
        url: raw.html_url,
        repo: extract_repo(&raw.repository_url),
        number: raw.number,
        state: raw.state,
        merged: merged_at.is_some(),
        created_at: raw.created_at,
        merged_at,
        review_comment_count: None,
    })
}

pub fn map_commit(item: Value) -> Result<Commit> {
    let raw: RawCommitItem = serde_json::from_value(item)?;

    Ok(Commit {
        message: first_line(&raw.commit.message).to_string(),
        sha: raw.sha,
        url: raw.html_url,
        repo: extract_repo(&raw.repository.url),
        date: raw.commit.author.date,
    })
}

pub fn map_pr_comment(item: Value) -> Result<PrComment> {
    let raw: RawIssue = serde_json::from_value(item)?;

    Ok(PrComment {
        pr_title: raw.title,
        pr_url: raw.html_url,
        pr_number: raw.number,
        repo: extract_repo(&raw.repository_url),
    })
}

/// Apply a mapper to every record, failing on the first malformed one
pub fn map_all<T>(items: Vec<Value>, mapper: fn(Value) -> Result<T>) -> Result<Vec<T>> {
    items.into_iter().map(mapper).collect()
}

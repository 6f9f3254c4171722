use crate::error::{RecapError, Result};
use crate::github::client::{GitHubClient, SearchEndpoint};
use crate::github::mapper::{map_all, map_commit, map_pr_comment, map_pull_request};
use crate::github::{query, ActivityData, Commit, DateRange, PrComment, PullRequest};
use std::collections::HashSet;
use std::future::Future;
use tracing::{info, instrument};

/// Source name recorded on every fetched dataset
pub const SOURCE_NAME: &str = "github";

/// Fetches a user's GitHub activity over a date range
#[derive(Clone)]
pub struct ActivitySource {
    client: GitHubClient,
}

impl ActivitySource {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Underlying API client
    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Run the four activity searches concurrently and assemble the dataset.
    ///
    /// Fails as a whole if any one of the searches fails.
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn fetch(
        &self,
        username: &str,
        range: DateRange,
        org: Option<&str>,
    ) -> Result<ActivityData> {
        let (prs_created, prs_reviewed, commented_on, commits) = tokio::try_join!(
            self.search_prs(query::prs_created(username, &range, org), range),
            self.search_prs(query::prs_reviewed(username, &range, org), range),
            self.search_pr_comments(query::pr_comments(username, &range, org), range),
            self.search_commits(query::commits(username, &range, org), range),
        )?;

        let pr_comments = dedup_comments(&prs_reviewed, commented_on);

        info!(
            prs_created = prs_created.len(),
            prs_reviewed = prs_reviewed.len(),
            pr_comments = pr_comments.len(),
            commits = commits.len(),
            "Fetched activity"
        );

        Ok(ActivityData {
            source: SOURCE_NAME.to_string(),
            date_range: range,
            username: username.to_string(),
            prs_created,
            prs_reviewed,
            commits,
            pr_comments,
        })
    }

    /// Like [`fetch`](Self::fetch), but abandons the fetch once `cancel` completes.
    ///
    /// Dropping the in-flight fetch aborts outstanding requests and any pending
    /// rate-limit sleep.
    pub async fn fetch_until<C>(
        &self,
        username: &str,
        range: DateRange,
        org: Option<&str>,
        cancel: C,
    ) -> Result<ActivityData>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.fetch(username, range, org) => result,
            _ = cancel => Err(RecapError::Cancelled),
        }
    }

    async fn search_prs(&self, q: String, range: DateRange) -> Result<Vec<PullRequest>> {
        let items = self.client.search_all(SearchEndpoint::Issues, q, range).await?;
        map_all(items, map_pull_request)
    }

    async fn search_pr_comments(&self, q: String, range: DateRange) -> Result<Vec<PrComment>> {
        let items = self.client.search_all(SearchEndpoint::Issues, q, range).await?;
        map_all(items, map_pr_comment)
    }

    async fn search_commits(&self, q: String, range: DateRange) -> Result<Vec<Commit>> {
        let items = self.client.search_all(SearchEndpoint::Commits, q, range).await?;
        map_all(items, map_commit)
    }
}

/// Drop comment entries for PRs already counted as reviewed
pub fn dedup_comments(reviewed: &[PullRequest], comments: Vec<PrComment>) -> Vec<PrComment> {
    let reviewed_urls: HashSet<&str> = reviewed.iter().map(|pr| pr.url.as_str()).collect();
    comments
        .into_iter()
        .filter(|c| !reviewed_urls.contains(c.pr_url.as_str()))
        .collect()
}

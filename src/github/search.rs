//! Search that sees past the 1000-result ceiling of the GitHub Search API.
//!
//! The API stops serving matches after the first 1000 of any query, however deep
//! you paginate. When a query reports more than that, the date range embedded in
//! the query text is halved and each half searched on its own, recursively, until
//! every sub-query fits under the cap or the range is down to a single day.

use crate::error::Result;
use crate::github::client::{GitHubClient, SearchEndpoint};
use crate::github::DateRange;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, warn};

/// Hard ceiling on matches reachable through pagination
pub const SEARCH_RESULT_CAP: u64 = 1000;

/// Results per page; the API maximum
pub const PAGE_SIZE: u32 = 100;

impl GitHubClient {
    /// Return every record matching `query`, whose text contains `range` as `since..until`.
    pub fn search_all<'a>(
        &'a self,
        endpoint: SearchEndpoint,
        query: String,
        range: DateRange,
    ) -> BoxFuture<'a, Result<Vec<Value>>> {
        async move {
            let first_page = self.fetch_page(endpoint, &query, 1, PAGE_SIZE).await?;
            let total_count = first_page.total_count;

            if total_count > SEARCH_RESULT_CAP {
                match range.bisect() {
                    Some((first, second)) => {
                        debug!(
                            endpoint = endpoint.path(),
                            %range,
                            days = range.num_days(),
                            %first,
                            %second,
                            total_count,
                            "Result count over search cap, splitting date range"
                        );
                        let first_query = rewrite_range(&query, &range, &first);
                        let second_query = rewrite_range(&query, &range, &second);

                        let (mut items, rest) = tokio::try_join!(
                            self.search_all(endpoint, first_query, first),
                            self.search_all(endpoint, second_query, second),
                        )?;
                        items.extend(rest);
                        return Ok(items);
                    }
                    None => warn!(
                        endpoint = endpoint.path(),
                        %range,
                        total_count,
                        "Single day exceeds search cap, results past {} are unreachable",
                        SEARCH_RESULT_CAP
                    ),
                }
            }

            self.paginate(endpoint, &query, first_page.items, total_count)
                .await
        }
        .boxed()
    }

    /// Fetch pages 2, 3, ... in order until `total_count` items or a short page
    async fn paginate(
        &self,
        endpoint: SearchEndpoint,
        query: &str,
        first_items: Vec<Value>,
        total_count: u64,
    ) -> Result<Vec<Value>> {
        let reachable = total_count.min(SEARCH_RESULT_CAP) as usize;
        let mut last_page_len = first_items.len();
        let mut items = first_items;
        let mut page = 2;

        while items.len() < reachable && last_page_len == PAGE_SIZE as usize {
            let next = self.fetch_page(endpoint, query, page, PAGE_SIZE).await?;
            last_page_len = next.items.len();
            items.extend(next.items);
            page += 1;
        }

        debug!(
            endpoint = endpoint.path(),
            pages = page - 1,
            items = items.len(),
            total_count,
            "Search complete"
        );
        Ok(items)
    }
}

/// Swap the `since..until` text of `from` in a query for that of `to`
fn rewrite_range(query: &str, from: &DateRange, to: &DateRange) -> String {
    query.replacen(&from.to_string(), &to.to_string(), 1)
}

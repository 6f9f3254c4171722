use crate::ai::cache::SummaryCache;
use crate::ai::claude::ClaudeCli;
use crate::ai::prompt::{generate_summary_prompt, resolve_instructions};
use crate::ai::{Summarizer, Summary};
use crate::config::{Config, OutputFormat, Period};
use crate::error::{RecapError, Result};
use crate::github::activity::ActivitySource;
use crate::github::client::GitHubClient;
use crate::github::{ActivityData, DateRange};
use crate::report::format_structured;
use std::future::Future;
use tracing::{debug, info};

/// What to recap
#[derive(Debug, Clone)]
pub struct RecapRequest {
    /// User to recap; `None` means the token owner
    pub username: Option<String>,
    pub date_range: DateRange,
    pub period: Period,
    pub org: Option<String>,
    pub format: OutputFormat,
    /// Preset value or custom instructions
    pub prompt: Option<String>,
}

/// Output of a recap run
#[derive(Debug, Clone)]
pub struct RecapResult {
    pub data: ActivityData,
    /// Structured report, when the format asks for text
    pub text: Option<String>,
    /// AI summary, when the format asks for one
    pub summary: Option<Summary>,
}

/// Orchestrator for coordinating the recap workflow
pub struct Orchestrator {
    config: Config,
    source: ActivitySource,
    summarizer: Box<dyn Summarizer>,
    cache: Option<SummaryCache>,
}

impl Orchestrator {
    /// Create an orchestrator talking to GitHub with `token`
    pub fn new(config: Config, token: String) -> Result<Self> {
        let client = GitHubClient::from_config(&config, token)?;
        let summarizer = Box::new(ClaudeCli::new(config.summarizer_command.clone()));

        let cache = if config.cache_enabled {
            let cache = SummaryCache::from_config(&config)?;
            let removed = cache.purge_expired()?;
            if removed > 0 {
                debug!(removed, "Removed expired summaries");
            }
            Some(cache)
        } else {
            None
        };

        Ok(Self::with_parts(config, ActivitySource::new(client), summarizer, cache))
    }

    /// Assemble from explicit parts
    pub fn with_parts(
        config: Config,
        source: ActivitySource,
        summarizer: Box<dyn Summarizer>,
        cache: Option<SummaryCache>,
    ) -> Self {
        Self {
            config,
            source,
            summarizer,
            cache,
        }
    }

    /// Username to recap: explicit, then config default, then token owner
    pub async fn resolve_username(&self, requested: Option<&str>) -> Result<String> {
        if let Some(name) = requested.or(self.config.default_username.as_deref()) {
            return Ok(name.to_string());
        }
        let login = self.source.client().resolve_username().await?;
        debug!(login = %login, "Resolved username from token");
        Ok(login)
    }

    /// Fetch activity, abandoning the fetch if `cancel` completes first
    pub async fn fetch_activity<C>(
        &self,
        username: &str,
        date_range: DateRange,
        org: Option<&str>,
        cancel: C,
    ) -> Result<ActivityData>
    where
        C: Future<Output = ()>,
    {
        let org = org.or(self.config.default_org.as_deref());
        self.source.fetch_until(username, date_range, org, cancel).await
    }

    /// Generate an AI summary, consulting the cache first
    pub async fn generate_summary(
        &self,
        data: &ActivityData,
        period: Period,
        prompt: Option<&str>,
    ) -> Result<Summary> {
        let instructions = resolve_instructions(prompt.unwrap_or(&self.config.prompt_preset));
        let full_prompt = generate_summary_prompt(data, period, &instructions);

        if let Some(ref cache) = self.cache {
            let cache_key = SummaryCache::key_for(&self.config.summarizer_command, &full_prompt);

            if let Some(cached_summary) = cache.get(&cache_key)? {
                info!(key = %cache_key, "Using cached summary");
                return Ok(cached_summary);
            }

            let summary = self.summarize(data, &full_prompt).await?;
            cache.set(&cache_key, summary.clone())?;
            Ok(summary)
        } else {
            self.summarize(data, &full_prompt).await
        }
    }

    async fn summarize(&self, data: &ActivityData, prompt: &str) -> Result<Summary> {
        let text = self.summarizer.summarize(prompt).await?;
        Ok(Summary::new(data.username.clone(), data.date_range, text))
    }

    /// Run a whole recap: resolve user, fetch, format, summarize.
    ///
    /// Completing `cancel` abandons whichever step is in flight.
    pub async fn recap<C>(&self, request: &RecapRequest, cancel: C) -> Result<RecapResult>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                info!("Recap cancelled");
                Err(RecapError::Cancelled)
            }
            result = self.run_recap(request) => result,
        }
    }

    async fn run_recap(&self, request: &RecapRequest) -> Result<RecapResult> {
        let username = self.resolve_username(request.username.as_deref()).await?;
        let data = self
            .fetch_activity(
                &username,
                request.date_range,
                request.org.as_deref(),
                std::future::pending(),
            )
            .await?;

        let text = request.format.includes_text().then(|| format_structured(&data));
        let summary = if request.format.includes_summary() {
            Some(
                self.generate_summary(&data, request.period, request.prompt.as_deref())
                    .await?,
            )
        } else {
            None
        };

        Ok(RecapResult { data, text, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::tests::{ok, param, FnTransport};
    use crate::github::client::{ApiRequest, ApiResponse, RetryPolicy};
    use crate::github::mapper::tests::{commit_json, issue_json};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Summarizer that records prompts and answers with a fixed text
    struct RecordingSummarizer {
        calls: Arc<AtomicUsize>,
        last_prompt: Arc<Mutex<String>>,
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        async fn summarize(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok("A productive week.".to_string())
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _prompt: &str) -> Result<String> {
            Err(RecapError::summarizer("claude CLI failed (exit 2)"))
        }
    }

    fn github_response(request: &ApiRequest) -> ApiResponse {
        if request.path == "/user" {
            return ok(json!({ "login": "token-owner" }));
        }
        let q = param(request, "q");
        let items = if q.starts_with("is:pr author:") {
            vec![issue_json("acme/widgets", 1, "Add gears", true)]
        } else if q.starts_with("author:") {
            vec![commit_json("acme/widgets", "abc", "Add gears\n\nbody")]
        } else {
            vec![]
        };
        ok(json!({ "total_count": items.len(), "items": items }))
    }

    struct Harness {
        orchestrator: Orchestrator,
        calls: Arc<AtomicUsize>,
        last_prompt: Arc<Mutex<String>>,
        transport: Arc<FnTransport<fn(&ApiRequest) -> ApiResponse>>,
        _dir: TempDir,
    }

    fn harness(config: Config, with_cache: bool) -> Harness {
        let transport: Arc<FnTransport<fn(&ApiRequest) -> ApiResponse>> =
            Arc::new(FnTransport::new(github_response as fn(&ApiRequest) -> ApiResponse));
        let source = ActivitySource::new(GitHubClient::new(transport.clone(), RetryPolicy::default()));

        let calls = Arc::new(AtomicUsize::new(0));
        let last_prompt = Arc::new(Mutex::new(String::new()));
        let summarizer = Box::new(RecordingSummarizer {
            calls: calls.clone(),
            last_prompt: last_prompt.clone(),
        });

        let dir = TempDir::new().unwrap();
        let cache = with_cache.then(|| SummaryCache::open(dir.path(), 24).unwrap());

        Harness {
            orchestrator: Orchestrator::with_parts(config, source, summarizer, cache),
            calls,
            last_prompt,
            transport,
            _dir: dir,
        }
    }

    fn request(format: OutputFormat) -> RecapRequest {
        RecapRequest {
            username: Some("alice".to_string()),
            date_range: DateRange::parse("2025-01-01", "2025-01-07").unwrap(),
            period: Period::Week,
            org: None,
            format,
            prompt: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_username_order() {
        let mut config = Config::default();
        let h = harness(config.clone(), false);
        assert_eq!(h.orchestrator.resolve_username(Some("bob")).await.unwrap(), "bob");
        assert_eq!(h.orchestrator.resolve_username(None).await.unwrap(), "token-owner");

        config.default_username = Some("carol".to_string());
        let h = harness(config, false);
        assert_eq!(h.orchestrator.resolve_username(None).await.unwrap(), "carol");
    }

    #[tokio::test]
    async fn test_recap_text_only_skips_summarizer() {
        let h = harness(Config::default(), false);
        let result = h
            .orchestrator
            .recap(&request(OutputFormat::Text), std::future::pending())
            .await
            .unwrap();

        assert!(result.summary.is_none());
        let text = result.text.unwrap();
        assert!(text.contains("[merged] Add gears (#1) - acme/widgets"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recap_both_with_preset_prompt() {
        let h = harness(Config::default(), false);
        let mut req = request(OutputFormat::Both);
        req.prompt = Some("roast".to_string());

        let result = h
            .orchestrator
            .recap(&req, std::future::pending())
            .await
            .unwrap();

        assert!(result.text.is_some());
        assert_eq!(result.summary.unwrap().text, "A productive week.");
        let prompt = h.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("brutally honest"));
        assert!(prompt.contains("- Add gears (acme/widgets)"));
    }

    #[tokio::test]
    async fn test_default_org_applies_to_queries() {
        let mut config = Config::default();
        config.default_org = Some("acme".to_string());
        let h = harness(config, false);

        h.orchestrator
            .recap(&request(OutputFormat::Text), std::future::pending())
            .await
            .unwrap();
        assert!(h
            .transport
            .queries()
            .iter()
            .all(|(q, _)| q.ends_with(" org:acme")));
    }

    #[tokio::test]
    async fn test_summary_cache_hit_skips_summarizer() {
        let h = harness(Config::default(), true);
        let data = h
            .orchestrator
            .fetch_activity(
                "alice",
                DateRange::parse("2025-01-01", "2025-01-07").unwrap(),
                None,
                std::future::pending(),
            )
            .await
            .unwrap();

        let first = h.orchestrator.generate_summary(&data, Period::Week, None).await.unwrap();
        let second = h.orchestrator.generate_summary(&data, Period::Week, None).await.unwrap();

        assert_eq!(first.text, second.text);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);

        // A different prompt misses the cache
        h.orchestrator
            .generate_summary(&data, Period::Week, Some("sprint"))
            .await
            .unwrap();
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_summarizer_failure_propagates() {
        let source = ActivitySource::new(GitHubClient::new(
            Arc::new(FnTransport::new(github_response as fn(&ApiRequest) -> ApiResponse)),
            RetryPolicy::default(),
        ));
        let orchestrator =
            Orchestrator::with_parts(Config::default(), source, Box::new(FailingSummarizer), None);

        let err = orchestrator
            .recap(&request(OutputFormat::Summary), std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit 2"));
    }

    #[tokio::test]
    async fn test_recap_cancelled() {
        let h = harness(Config::default(), false);
        let err = h
            .orchestrator
            .recap(&request(OutputFormat::Both), std::future::ready(()))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Cancelled));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }
}

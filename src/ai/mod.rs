pub mod cache;
pub mod claude;
pub mod prompt;

use crate::error::Result;
use crate::github::DateRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Turns a prompt into narrative text
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

/// AI-generated summary of a user's activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// GitHub user the summary is about
    pub username: String,
    /// Period the activity covers
    pub date_range: DateRange,
    /// Narrative text returned by the summarizer
    pub text: String,
    /// When this summary was generated
    pub generated_at: DateTime<Utc>,
}

impl Summary {
    /// Create a new summary
    pub fn new(username: String, date_range: DateRange, text: String) -> Self {
        Self {
            username,
            date_range,
            text,
            generated_at: Utc::now(),
        }
    }

    /// Format summary for terminal output
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "=== AI Summary: {} ({} to {}) ===\n\n",
            self.username, self.date_range.since, self.date_range.until
        ));
        output.push_str(&self.text);
        output.push_str("\n\n");
        output.push_str(&format!(
            "*Generated at: {}*\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_creation() {
        let range = DateRange::parse("2025-01-01", "2025-01-07").unwrap();
        let summary = Summary::new("alice".to_string(), range, "Shipped gears.".to_string());

        assert_eq!(summary.username, "alice");
        assert_eq!(summary.text, "Shipped gears.");
        assert_eq!(summary.date_range, range);
    }

    #[test]
    fn test_summary_render() {
        let range = DateRange::parse("2025-01-01", "2025-01-07").unwrap();
        let summary = Summary::new("alice".to_string(), range, "Shipped gears.".to_string());

        let rendered = summary.render();
        assert!(rendered.contains("AI Summary: alice (2025-01-01 to 2025-01-07)"));
        assert!(rendered.contains("Shipped gears."));
        assert!(rendered.contains("*Generated at:"));
    }
}

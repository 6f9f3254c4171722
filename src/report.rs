//! Plain-text activity report.

use crate::github::{ActivityData, PrState};
use std::collections::HashMap;

/// `"s"` unless `n == 1`
fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Render the structured text recap of an activity dataset
pub fn format_structured(data: &ActivityData) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== GitHub Activity Recap ===".to_string());
    lines.push(format!(
        "Period: {} to {}",
        data.date_range.since, data.date_range.until
    ));
    lines.push(format!("User: {}", data.username));
    lines.push(String::new());

    // PRs created
    let merged = data.prs_created.iter().filter(|pr| pr.merged).count();
    let open = data
        .prs_created
        .iter()
        .filter(|pr| !pr.merged && pr.state == PrState::Open)
        .count();
    let closed = data
        .prs_created
        .iter()
        .filter(|pr| !pr.merged && pr.state == PrState::Closed)
        .count();

    lines.push(format!(
        "--- Pull Requests Created ({}) ---",
        data.prs_created.len()
    ));
    if data.prs_created.is_empty() {
        lines.push("  (none)".to_string());
    }
    for pr in &data.prs_created {
        lines.push(format!(
            "  [{}] {} (#{}) - {}",
            pr.status_label(),
            pr.title,
            pr.number,
            pr.repo
        ));
    }
    lines.push(String::new());

    // PRs reviewed
    let review_comments: usize = data
        .prs_reviewed
        .iter()
        .map(|pr| pr.review_comment_count.unwrap_or(0) as usize)
        .sum();
    lines.push(format!(
        "--- Pull Requests Reviewed ({}, {} review comment{}) ---",
        data.prs_reviewed.len(),
        review_comments,
        plural(review_comments)
    ));
    if data.prs_reviewed.is_empty() {
        lines.push("  (none)".to_string());
    }
    for pr in &data.prs_reviewed {
        let comment_info = match pr.review_comment_count {
            Some(n) if n > 0 => format!(" ({} comment{})", n, plural(n as usize)),
            _ => String::new(),
        };
        lines.push(format!(
            "  {} #{} - {}{}",
            pr.repo, pr.number, pr.title, comment_info
        ));
    }
    lines.push(String::new());

    // PRs commented on
    lines.push(format!(
        "--- Pull Requests Commented On ({}) ---",
        data.pr_comments.len()
    ));
    if data.pr_comments.is_empty() {
        lines.push("  (none)".to_string());
    }
    for comment in &data.pr_comments {
        lines.push(format!(
            "  {} #{} - {}",
            comment.repo, comment.pr_number, comment.pr_title
        ));
    }
    lines.push(String::new());

    // Commits, grouped by repository
    lines.push(format!("--- Commits ({}) ---", data.commits.len()));
    if data.commits.is_empty() {
        lines.push("  (none)".to_string());
    } else {
        let mut by_repo: HashMap<&str, usize> = HashMap::new();
        for commit in &data.commits {
            *by_repo.entry(commit.repo.as_str()).or_insert(0) += 1;
        }
        let mut by_repo: Vec<_> = by_repo.into_iter().collect();
        by_repo.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        lines.push("  By repository:".to_string());
        for (repo, count) in by_repo {
            lines.push(format!("    {} ({} commit{})", repo, count, plural(count)));
        }
    }
    lines.push(String::new());

    // Summary counts
    let created = data.prs_created.len();
    let reviewed = data.prs_reviewed.len();
    let commented = data.pr_comments.len();
    let commits = data.commits.len();
    let repos = data.commit_repo_count();

    lines.push("--- Summary ---".to_string());
    lines.push(format!(
        "  {} PR{} created ({} merged, {} open, {} closed)",
        created,
        plural(created),
        merged,
        open,
        closed
    ));
    lines.push(format!(
        "  {} PR{} reviewed ({} review comment{})",
        reviewed,
        plural(reviewed),
        review_comments,
        plural(review_comments)
    ));
    lines.push(format!("  {} PR{} commented on", commented, plural(commented)));
    lines.push(format!(
        "  {} commit{} across {} repo{}",
        commits,
        plural(commits),
        repos,
        plural(repos)
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Commit, DateRange, PrComment, PullRequest};
    use chrono::Utc;

    fn empty_data() -> ActivityData {
        ActivityData {
            source: "github".to_string(),
            date_range: DateRange::parse("2025-02-16", "2025-02-23").unwrap(),
            username: "testuser".to_string(),
            prs_created: vec![],
            prs_reviewed: vec![],
            commits: vec![],
            pr_comments: vec![],
        }
    }

    fn pr(number: u64, title: &str, state: PrState, merged: bool) -> PullRequest {
        PullRequest {
            title: title.to_string(),
            url: format!("https://github.com/org/repo/pull/{}", number),
            repo: "org/repo".to_string(),
            number,
            state,
            merged,
            created_at: Utc::now(),
            merged_at: merged.then(Utc::now),
            review_comment_count: None,
        }
    }

    fn commit(sha: &str, repo: &str) -> Commit {
        Commit {
            message: "msg".to_string(),
            sha: sha.to_string(),
            url: String::new(),
            repo: repo.to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_header_shows_period_and_user() {
        let output = format_structured(&empty_data());
        assert!(output.contains("GitHub Activity Recap"));
        assert!(output.contains("2025-02-16 to 2025-02-23"));
        assert!(output.contains("testuser"));
        assert!(output.contains("(none)"));
    }

    #[test]
    fn test_prs_created_with_status_tags() {
        let mut data = empty_data();
        data.prs_created = vec![
            pr(1, "Fix auth bug", PrState::Closed, true),
            pr(2, "Add feature", PrState::Open, false),
        ];

        let output = format_structured(&data);
        assert!(output.contains("[merged] Fix auth bug (#1) - org/repo"));
        assert!(output.contains("[open] Add feature (#2) - org/repo"));
        assert!(output.contains("Pull Requests Created (2)"));
    }

    #[test]
    fn test_commits_grouped_by_repo() {
        let mut data = empty_data();
        data.commits = vec![
            commit("abc", "org/repo-a"),
            commit("def", "org/repo-a"),
            commit("ghi", "org/repo-b"),
        ];

        let output = format_structured(&data);
        assert!(output.contains("org/repo-a (2 commits)"));
        assert!(output.contains("org/repo-b (1 commit)"));
        let a = output.find("org/repo-a").unwrap();
        let b = output.find("org/repo-b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_review_comment_counts() {
        let mut data = empty_data();
        let mut reviewed = pr(5, "Bob's change", PrState::Open, false);
        reviewed.review_comment_count = Some(1);
        data.prs_reviewed = vec![reviewed];

        let output = format_structured(&data);
        assert!(output.contains("Pull Requests Reviewed (1, 1 review comment)"));
        assert!(output.contains("org/repo #5 - Bob's change (1 comment)"));
    }

    #[test]
    fn test_summary_counts() {
        let mut data = empty_data();
        data.prs_created = vec![pr(1, "PR", PrState::Closed, true)];
        data.prs_reviewed = vec![pr(2, "PR2", PrState::Closed, true)];
        data.commits = vec![commit("a", "org/repo")];
        data.pr_comments = vec![PrComment {
            pr_title: "PR3".to_string(),
            pr_url: String::new(),
            pr_number: 3,
            repo: "org/repo".to_string(),
        }];

        let output = format_structured(&data);
        assert!(output.contains("1 PR created (1 merged, 0 open, 0 closed)"));
        assert!(output.contains("1 PR reviewed"));
        assert!(output.contains("1 commit across 1 repo"));
        assert!(output.contains("1 PR commented on"));
        assert!(output.contains("org/repo #3 - PR3"));
    }
}

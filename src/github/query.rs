use crate::github::DateRange;

/// Trailing ` org:<org>` clause, empty when no org filter is set
fn org_filter(org: Option<&str>) -> String {
    match org {
        Some(org) if !org.is_empty() => format!(" org:{}", org),
        _ => String::new(),
    }
}

/// PRs opened by the user
pub fn prs_created(username: &str, range: &DateRange, org: Option<&str>) -> String {
    format!(
        "is:pr author:{} created:{}{}",
        username,
        range,
        org_filter(org)
    )
}

/// PRs the user reviewed, excluding their own
pub fn prs_reviewed(username: &str, range: &DateRange, org: Option<&str>) -> String {
    format!(
        "is:pr reviewed-by:{} -author:{} created:{}{}",
        username,
        username,
        range,
        org_filter(org)
    )
}

/// PRs the user commented on, excluding their own
pub fn pr_comments(username: &str, range: &DateRange, org: Option<&str>) -> String {
    format!(
        "is:pr commenter:{} -author:{} created:{}{}",
        username,
        username,
        range,
        org_filter(org)
    )
}

/// Commits authored by the user
pub fn commits(username: &str, range: &DateRange, org: Option<&str>) -> String {
    format!("author:{} author-date:{}{}", username, range, org_filter(org))
}

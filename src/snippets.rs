//! Canned remediation snippets
//!
//! Purely templated: an issue label plus free-form context (typically the
//! requesting origin) selects a response-header snippet. No analysis logic
//! lives here.

/// Returns a remediation snippet for the given issue label
///
/// The label is matched by substring, so callers can pass either a pattern
/// id (`missing-allow-origin`) or a prose title. Unknown labels get a
/// generic snippet. The context value, when non-empty, is interpolated as
/// the origin to allow.
pub fn code_example(issue: &str, context: &str) -> String {
    let issue = issue.to_ascii_lowercase();
    let origin = if context.trim().is_empty() {
        "https://app.example.com"
    } else {
        context.trim()
    };

    if issue.contains("credentials") || issue.contains("wildcard") {
        format!(
            "Access-Control-Allow-Origin: {}\n\
             Access-Control-Allow-Credentials: true\n\
             Vary: Origin",
            origin
        )
    } else if issue.contains("allow-methods") || issue.contains("method") {
        "Access-Control-Allow-Methods: GET, POST, PUT, DELETE, OPTIONS".to_string()
    } else if issue.contains("allow-headers") || issue.contains("header") {
        "Access-Control-Allow-Headers: Content-Type, Authorization".to_string()
    } else if issue.contains("mismatch") {
        format!(
            "# Echo the requesting origin after checking it against your allow-list\n\
             Access-Control-Allow-Origin: {}\n\
             Vary: Origin",
            origin
        )
    } else if issue.contains("origin") {
        format!(
            "Access-Control-Allow-Origin: {}\n\
             Vary: Origin",
            origin
        )
    } else {
        format!(
            "Access-Control-Allow-Origin: {}\n\
             Access-Control-Allow-Methods: GET, POST, OPTIONS\n\
             Access-Control-Allow-Headers: Content-Type",
            origin
        )
    }
}

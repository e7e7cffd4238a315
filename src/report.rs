//! Console rendering of diagnoses and ledger entries
//!
//! Pure string builders: nothing here prints. [`render`] colorizes by
//! severity with ANSI escapes; [`render_plain`] produces the same layout
//! without them, for logs and tests.

use ansi_term::{Colour, Style};

use crate::history::ErrorEntry;
use crate::{Diagnosis, Severity};

fn style_for(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Colour::Red.bold(),
        Severity::Warning => Colour::Yellow.normal(),
        Severity::Info => Colour::Cyan.normal(),
    }
}

fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

fn render_with<F>(diagnoses: &[Diagnosis], paint: F) -> String
where
    F: Fn(Severity, &str) -> String,
{
    if diagnoses.is_empty() {
        return "No CORS issues detected.\n".to_string();
    }
    let mut out = String::new();
    for diagnosis in diagnoses {
        out.push_str(&paint(
            diagnosis.severity,
            &format!("[{}] {}", label(diagnosis.severity), diagnosis.issue),
        ));
        out.push('\n');
        out.push_str(&format!("  {}\n", diagnosis.description));
        out.push_str(&format!("  fix: {}\n", diagnosis.recommendation));
        if let Some(example) = &diagnosis.code_example {
            for line in example.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }
    out
}

/// Renders diagnoses with ANSI colors, critical red, warning yellow, info
/// cyan
pub fn render(diagnoses: &[Diagnosis]) -> String {
    render_with(diagnoses, |severity, text| {
        style_for(severity).paint(text).to_string()
    })
}

/// Renders diagnoses without escape codes
pub fn render_plain(diagnoses: &[Diagnosis]) -> String {
    render_with(diagnoses, |_, text| text.to_string())
}

/// Renders one ledger entry as a single summary line plus its diagnoses
pub fn render_entry(entry: &ErrorEntry) -> String {
    let mut out = format!(
        "{} {} {} (origin `{}`, seen {}x)\n",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.method,
        entry.route,
        entry.origin,
        entry.count,
    );
    out.push_str(&render_plain(&entry.diagnoses));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn diagnosis(severity: Severity) -> Diagnosis {
        Diagnosis {
            issue: "Missing Access-Control-Allow-Origin header".to_string(),
            description: "The response carries no allow-origin header.".to_string(),
            recommendation: "Send the header.".to_string(),
            code_example: Some("Access-Control-Allow-Origin: https://a.example.com".to_string()),
            pattern: None,
            severity,
        }
    }

    #[test]
    fn plain_rendering_has_no_escape_codes() {
        let out = render_plain(&[diagnosis(Severity::Critical)]);
        assert!(!out.contains('\u{1b}'));
        assert!(out.contains("[CRITICAL]"));
        assert!(out.contains("fix:"));
        assert!(out.contains("Access-Control-Allow-Origin"));
    }

    #[test]
    fn colored_rendering_marks_severity() {
        let out = render(&[diagnosis(Severity::Warning)]);
        assert!(out.contains("[WARNING]"));
    }

    #[test]
    fn empty_input_renders_a_clean_bill() {
        assert!(render(&[]).contains("No CORS issues"));
    }

    #[test]
    fn entry_rendering_includes_route_and_count() {
        let entry = ErrorEntry {
            timestamp: Utc::now(),
            route: "/api/data".to_string(),
            method: "GET".to_string(),
            origin: "https://app.example.com".to_string(),
            diagnoses: vec![diagnosis(Severity::Critical)],
            count: 4,
        };
        let out = render_entry(&entry);
        assert!(out.contains("/api/data"));
        assert!(out.contains("seen 4x"));
    }
}

//! Advisory security checks over a resolved CORS configuration
//!
//! Unlike [`CorsConfig::validate`](crate::CorsConfig::validate), which hard
//! rejects impossible configurations, these rules only report. Each rule is
//! independent and order-insensitive; the result list is sorted by severity.

use crate::{CorsConfig, Severity};

/// Deployment environment the configuration is judged against
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    /// Production: wildcard origins are flagged
    Production,
    /// Development: wildcard origins are tolerated
    Development,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Production
    }
}

/// A single finding produced by the rule set
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityIssue {
    /// How serious the finding is
    pub level: Severity,
    /// Short title of the finding
    pub title: String,
    /// What the configuration does and why it matters
    pub description: String,
    /// What to change
    pub recommendation: String,
}

/// Headers that should never be exposed to cross-origin JavaScript
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-csrf-token",
    "x-xsrf-token",
    "x-api-key",
    "x-auth-token",
    "x-access-token",
    "x-refresh-token",
];

/// Methods worth calling out when opened up cross-origin
const RISKY_METHODS: &[&str] = &["DELETE", "PUT", "PATCH", "TRACE"];

/// Runs every rule against the configuration and returns the findings
/// sorted by severity (critical first). An empty configuration yields an
/// empty list.
pub fn check_security(config: &CorsConfig, environment: Environment) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();

    let wildcard = config
        .origin
        .as_ref()
        .map_or(false, |origin| origin.is_wildcard());

    if wildcard && environment == Environment::Production {
        issues.push(SecurityIssue {
            level: Severity::Warning,
            title: "Wildcard origin in production".to_string(),
            description: "Any website can make cross-origin requests to this service because \
                          the allowed origin is `*`."
                .to_string(),
            recommendation: "Restrict the allowed origins to an explicit list of trusted \
                             sites in production."
                .to_string(),
        });
    }

    // Fires independently of the production rule; both can co-occur.
    if wildcard && config.credentials == Some(true) {
        issues.push(SecurityIssue {
            level: Severity::Critical,
            title: "Credentials allowed with wildcard origin".to_string(),
            description: "Allowing credentials together with a wildcard origin would let any \
                          site perform authenticated requests. Browsers refuse the \
                          combination outright."
                .to_string(),
            recommendation: "Name explicit origins whenever credentials are enabled."
                .to_string(),
        });
    }

    if let Some(exposed) = &config.exposed_headers {
        let offending: Vec<String> = exposed
            .iter()
            .filter(|header| {
                SENSITIVE_HEADERS
                    .iter()
                    .any(|sensitive| header.eq_ignore_ascii_case(sensitive))
            })
            .map(|header| header.to_string())
            .collect();
        if !offending.is_empty() {
            issues.push(SecurityIssue {
                level: Severity::Warning,
                title: "Sensitive headers exposed".to_string(),
                description: format!(
                    "The following exposed headers can carry credentials or tokens readable \
                     by cross-origin JavaScript: {}",
                    offending.join(", ")
                ),
                recommendation: "Remove credential-bearing headers from \
                                 Access-Control-Expose-Headers."
                    .to_string(),
            });
        }
    }

    if let Some(methods) = &config.methods {
        let offending: Vec<String> = methods
            .iter()
            .filter(|method| {
                RISKY_METHODS
                    .iter()
                    .any(|risky| method.eq_ignore_ascii_case(risky))
            })
            .map(|method| method.to_uppercase())
            .collect();
        if !offending.is_empty() {
            issues.push(SecurityIssue {
                level: Severity::Info,
                title: "Mutating methods allowed cross-origin".to_string(),
                description: format!(
                    "Cross-origin callers may use methods that modify state: {}",
                    offending.join(", ")
                ),
                recommendation: "Confirm every allowed method is intended to be callable \
                                 from other origins."
                    .to_string(),
            });
        }
    }

    // Stable sort keeps declaration order within a severity band.
    issues.sort_by_key(|issue| issue.level);
    issues
}

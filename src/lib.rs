//! Diagnose CORS misconfigurations from HTTP request/response header pairs
//!
//! `cors_doctor` inspects the headers a server actually received and the
//! headers it is about to send, classifies what is wrong against a catalog
//! of known CORS failure patterns, and produces human-readable diagnoses
//! with remediation snippets. It never intercepts network traffic and never
//! enforces anything; it only observes and reports.
//!
//! ## Analyzing a header pair
//!
//! The core entry point is [`analyze_headers`] (or [`Analyzer`] when you
//! want to pick the environment the security rules are judged against):
//!
//! ```rust
//! use cors_doctor::{analyze_headers, HeaderView, Severity};
//!
//! let request = HeaderView::from_pairs(vec![("Origin", "https://app.example.com")]);
//! let response = HeaderView::new();
//!
//! let diagnoses = analyze_headers(&request, "GET", &response);
//! assert!(diagnoses.iter().any(|d| d.severity == Severity::Critical));
//! ```
//!
//! Analysis is total: any input, including empty header maps and
//! non-standard methods, yields a (possibly empty) list and never panics.
//!
//! ## Simulating a configuration
//!
//! [`test_origin`] answers "would this origin get through?" for a
//! [`CorsConfig`] without running a server:
//!
//! ```rust
//! use cors_doctor::{test_origin, AllowedOrigins, CorsConfig};
//!
//! let config = CorsConfig {
//!     origin: Some(AllowedOrigins::List(vec![
//!         "https://example.com".to_string(),
//!         "https://app.example.com".to_string(),
//!     ])),
//!     ..CorsConfig::default()
//! };
//!
//! let result = test_origin("https://app.example.com", &config);
//! assert!(result.allowed);
//! ```
//!
//! [`compare_config`] diffs a current configuration against an expected
//! one, and [`check_security`] audits a single configuration for risky
//! settings.
//!
//! ## Observing a request pipeline
//!
//! The [`Inspector`](inspector::Inspector) wraps an [`Analyzer`] and an
//! [`ErrorHistory`] ledger for hosts that want per-request observation with
//! deduplicated history; the [`ErrorMonitor`](monitor::ErrorMonitor) does
//! keyword analysis over free-text error messages. Both are thin
//! collaborators around the core.
//!
//! ## Features
//!
//! The default `serialization` feature enables serde support for the data
//! model ([`CorsConfig`] deserializes from the usual JSON shapes, including
//! `true`/`false`/string/list origins). Disable default features to drop
//! the serde dependency.

#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]

#[cfg(test)]
#[macro_use]
mod test_macros;

pub mod analyzer;
pub mod headers;
pub mod history;
pub mod inspector;
pub mod monitor;
pub mod patterns;
pub mod report;
pub mod security;
pub mod snippets;

use std::error;
use std::fmt;

#[cfg(feature = "serialization")]
use serde_derive::{Deserialize, Serialize};
use url::Url;

pub use crate::analyzer::{
    analyze_headers, compare_config, snapshot_from_response, test_origin, Analyzer, ConfigDiff,
    ConfigMismatch, OriginTestResult, PreflightOutcome,
};
pub use crate::headers::{is_preflight, normalize_origin, HeaderFieldName, HeaderView};
pub use crate::history::{ErrorEntry, ErrorHistory, DEFAULT_CAPACITY};
pub use crate::inspector::{Exchange, Inspector};
pub use crate::monitor::{ErrorMonitor, ErrorReport};
pub use crate::patterns::{detect_pattern, ErrorPattern, PatternInput, CATALOG};
pub use crate::security::{check_security, Environment, SecurityIssue};

/// How serious a diagnosis is
///
/// The derived ordering ranks `Critical` before `Warning` before `Info`,
/// which is the sort order of the security rule set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// The request is broken: the browser will block it
    Critical,
    /// Works, but misconfigured or risky
    Warning,
    /// Worth knowing, not necessarily wrong
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{}", label)
    }
}

/// A single structured finding about a CORS misconfiguration
///
/// Immutable once created; produced by the analyzer and consumed by the
/// history ledger and presentation layers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Diagnosis {
    /// Short title of the problem
    pub issue: String,
    /// What is wrong, in prose
    pub description: String,
    /// What to change, in prose
    pub recommendation: String,
    /// An optional remediation snippet
    pub code_example: Option<String>,
    /// The catalog entry this diagnosis corresponds to, when it has one
    pub pattern: Option<&'static str>,
    /// How serious the finding is
    pub severity: Severity,
}

/// The origins a configuration allows
///
/// Mirrors the shapes CORS configurations are usually written in: a
/// wildcard, an explicit off switch, one exact origin, or a list.
/// Serializes as `true` / `false` / a string / a sequence respectively.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AllowedOrigins {
    /// Any origin is allowed (the `*` / `true` shape)
    Any,
    /// Cross-origin access is disabled outright (the `false` shape)
    Disabled,
    /// Exactly one origin is allowed
    Exact(String),
    /// A list of allowed origins
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Whether this configuration amounts to a wildcard
    ///
    /// `Any`, the literal `"*"`, and a list containing `"*"` all count.
    pub fn is_wildcard(&self) -> bool {
        match self {
            AllowedOrigins::Any => true,
            AllowedOrigins::Disabled => false,
            AllowedOrigins::Exact(origin) => origin == "*",
            AllowedOrigins::List(origins) => origins.iter().any(|origin| origin == "*"),
        }
    }
}

impl fmt::Display for AllowedOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedOrigins::Any => write!(f, "*"),
            AllowedOrigins::Disabled => write!(f, "false"),
            AllowedOrigins::Exact(origin) => write!(f, "{}", origin),
            AllowedOrigins::List(origins) => write!(f, "{}", origins.join(", ")),
        }
    }
}

/// A CORS configuration, desired or reconstructed from observed headers
///
/// Every property is optional; `None` means "property absent". There is no
/// representation of an explicitly-unset value; absent and unset are the
/// same thing here.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default, rename_all = "camelCase"))]
pub struct CorsConfig {
    /// The origins allowed to make requests
    pub origin: Option<AllowedOrigins>,
    /// Methods allowed for non-simple requests
    pub methods: Option<Vec<String>>,
    /// Request headers the client may send
    pub allowed_headers: Option<Vec<HeaderFieldName>>,
    /// Response headers exposed to cross-origin JavaScript
    pub exposed_headers: Option<Vec<HeaderFieldName>>,
    /// Whether credentialed requests are allowed
    pub credentials: Option<bool>,
    /// How long preflight results may be cached, in seconds
    pub max_age: Option<usize>,
}

impl CorsConfig {
    /// Rejects configurations that can never work
    ///
    /// This is the hard-fail counterpart to the advisory
    /// [`check_security`] rule set: credentials combined with a wildcard
    /// origin, and configured origins that are not URLs (other than the
    /// special values `"*"` and `"null"`).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = &self.origin {
            if self.credentials == Some(true) && origin.is_wildcard() {
                return Err(ConfigError::CredentialsWithWildcardOrigin);
            }
            let configured: &[String] = match origin {
                AllowedOrigins::Exact(origin) => std::slice::from_ref(origin),
                AllowedOrigins::List(origins) => origins,
                _ => &[],
            };
            for origin in configured {
                if origin == "*" || origin == "null" {
                    continue;
                }
                if let Err(source) = Url::parse(origin) {
                    return Err(ConfigError::BadOrigin {
                        origin: origin.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Errors from [`CorsConfig::validate`]
#[derive(Debug)]
pub enum ConfigError {
    /// Credentials are allowed, but the origin is a wildcard. Browsers
    /// reject this combination, so the configuration can never work.
    CredentialsWithWildcardOrigin,
    /// A configured origin does not parse as a URL
    BadOrigin {
        /// The offending configured value
        origin: String,
        /// The underlying parse error
        source: url::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CredentialsWithWildcardOrigin => write!(
                f,
                "credentials are allowed, but the origin is set to `*`; \
                 browsers reject this combination"
            ),
            ConfigError::BadOrigin { origin, source } => {
                write!(f, "configured origin `{}` is not a valid URL: {}", origin, source)
            }
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::BadOrigin { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(feature = "serialization")]
mod origins_serde {
    use std::fmt;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::AllowedOrigins;

    impl Serialize for AllowedOrigins {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                AllowedOrigins::Any => serializer.serialize_bool(true),
                AllowedOrigins::Disabled => serializer.serialize_bool(false),
                AllowedOrigins::Exact(origin) => serializer.serialize_str(origin),
                AllowedOrigins::List(origins) => origins.serialize(serializer),
            }
        }
    }

    impl<'de> Deserialize<'de> for AllowedOrigins {
        fn deserialize<D>(deserializer: D) -> Result<AllowedOrigins, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct OriginsVisitor;

            impl<'de> Visitor<'de> for OriginsVisitor {
                type Value = AllowedOrigins;

                fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                    formatter
                        .write_str("a boolean, an origin string, or a sequence of origin strings")
                }

                fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(if value {
                        AllowedOrigins::Any
                    } else {
                        AllowedOrigins::Disabled
                    })
                }

                fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(AllowedOrigins::Exact(value.to_string()))
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut origins = Vec::new();
                    while let Some(origin) = seq.next_element::<String>()? {
                        origins.push(origin);
                    }
                    Ok(AllowedOrigins::List(origins))
                }
            }

            deserializer.deserialize_any(OriginsVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ranks_critical_first() {
        assert!(Severity::Critical < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }

    #[test]
    fn wildcard_detection_covers_every_shape() {
        assert!(AllowedOrigins::Any.is_wildcard());
        assert!(AllowedOrigins::Exact("*".to_string()).is_wildcard());
        assert!(AllowedOrigins::List(vec!["https://a.example.com".to_string(), "*".to_string()])
            .is_wildcard());
        assert!(!AllowedOrigins::Disabled.is_wildcard());
        assert!(!AllowedOrigins::Exact("https://a.example.com".to_string()).is_wildcard());
    }

    #[test]
    fn validation_accepts_a_sensible_config() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::List(vec![
                "https://app.example.com".to_string(),
                "null".to_string(),
            ])),
            credentials: Some(true),
            ..CorsConfig::default()
        };
        not_err!(config.validate());
    }

    #[test]
    fn validation_rejects_credentials_with_wildcard() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Any),
            credentials: Some(true),
            ..CorsConfig::default()
        };
        let error = is_err!(config.validate());
        assert_matches!(error, ConfigError::CredentialsWithWildcardOrigin);
    }

    #[test]
    fn validation_rejects_unparseable_origins() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("not a url".to_string())),
            ..CorsConfig::default()
        };
        let error = is_err!(config.validate());
        let origin = assert_matches!(error, ConfigError::BadOrigin { origin, .. }, origin);
        assert_eq!(origin, "not a url");
    }

    #[test]
    fn validation_accepts_wildcard_without_credentials() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("*".to_string())),
            ..CorsConfig::default()
        };
        not_err!(config.validate());
    }

    #[cfg(feature = "serialization")]
    mod serialization {
        use super::*;
        use serde_test::{assert_tokens, Token};

        #[test]
        fn origins_round_trip_as_bool() {
            assert_tokens(&AllowedOrigins::Any, &[Token::Bool(true)]);
            assert_tokens(&AllowedOrigins::Disabled, &[Token::Bool(false)]);
        }

        #[test]
        fn origins_round_trip_as_string() {
            assert_tokens(
                &AllowedOrigins::Exact("https://app.example.com".to_string()),
                &[Token::Str("https://app.example.com")],
            );
        }

        #[test]
        fn origins_round_trip_as_sequence() {
            assert_tokens(
                &AllowedOrigins::List(vec![
                    "https://a.example.com".to_string(),
                    "https://b.example.com".to_string(),
                ]),
                &[
                    Token::Seq { len: Some(2) },
                    Token::Str("https://a.example.com"),
                    Token::Str("https://b.example.com"),
                    Token::SeqEnd,
                ],
            );
        }

        #[test]
        fn empty_json_deserializes_to_the_default_config() {
            let config: CorsConfig = serde_json::from_str("{}").expect("valid json");
            assert_eq!(config, CorsConfig::default());
        }

        #[test]
        fn config_deserializes_from_the_usual_json_shape() {
            let json = r#"{
                "origin": ["https://a.example.com", "https://b.example.com"],
                "methods": ["GET", "POST"],
                "allowedHeaders": ["Content-Type", "Authorization"],
                "credentials": true,
                "maxAge": 600
            }"#;
            let config: CorsConfig = serde_json::from_str(json).expect("valid json");
            assert_eq!(
                config.origin,
                Some(AllowedOrigins::List(vec![
                    "https://a.example.com".to_string(),
                    "https://b.example.com".to_string(),
                ]))
            );
            assert_eq!(config.credentials, Some(true));
            assert_eq!(config.max_age, Some(600));
            assert!(config
                .allowed_headers
                .as_ref()
                .expect("headers")
                .contains(&"content-type".into()));
        }

        #[test]
        fn severity_serializes_lowercase() {
            let json = serde_json::to_string(&Severity::Critical).expect("serializes");
            assert_eq!(json, "\"critical\"");
        }

        #[test]
        fn diagnosis_serializes_with_pattern_id() {
            let diagnosis = Diagnosis {
                issue: "Wildcard origin with credentials".to_string(),
                description: "…".to_string(),
                recommendation: "…".to_string(),
                code_example: None,
                pattern: Some("wildcard-credentials-conflict"),
                severity: Severity::Critical,
            };
            let json = serde_json::to_string(&diagnosis).expect("serializes");
            assert!(json.contains("wildcard-credentials-conflict"));
            assert!(json.contains("\"critical\""));
        }
    }
}

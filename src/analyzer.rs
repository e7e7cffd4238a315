//! The analyzer: header-pair diagnosis, configuration diff, origin simulation
//!
//! [`Analyzer::analyze`] is the orchestrator: it runs the ad hoc checks,
//! then the pattern catalog, then the security rule set, and merges the
//! results into one ranked list. It is total: any input, including empty
//! header maps and non-standard methods, yields a (possibly empty) list.

use std::collections::BTreeMap;

use crate::headers::names::{
    ALLOW_CREDENTIALS, ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, EXPOSE_HEADERS, MAX_AGE,
    ORIGIN, REQUEST_HEADERS,
};
use crate::headers::{is_preflight, normalize_origin, split_list, HeaderView};
use crate::patterns::{detect_pattern, PatternInput};
use crate::security::{check_security, Environment};
use crate::{snippets, AllowedOrigins, CorsConfig, Diagnosis, Severity};

/// Diagnoses CORS misconfigurations from observed header pairs
///
/// The analyzer holds only the environment the security rules are judged
/// against; every operation is a pure function of its inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Analyzer {
    /// Environment passed to the security rule set
    pub environment: Environment,
}

impl Analyzer {
    /// An analyzer judging security rules against the given environment
    pub fn new(environment: Environment) -> Self {
        Analyzer { environment }
    }

    /// Diagnoses a request/response header pair
    ///
    /// The returned list is ordered: ad hoc critical checks first, then a
    /// catalog match (if its pattern id is not already represented), then
    /// security findings. Callers may rely on critical issues appearing
    /// before the security tail, but not on exhaustiveness beyond that.
    pub fn analyze(
        &self,
        request: &HeaderView,
        method: &str,
        response: &HeaderView,
    ) -> Vec<Diagnosis> {
        let mut diagnoses = Vec::new();

        let origin = request.get(ORIGIN).map(normalize_origin).unwrap_or_default();
        let allow_origin = response.get(ALLOW_ORIGIN);

        // Missing Access-Control-Allow-Origin entirely.
        if !origin.is_empty() && allow_origin.is_none() {
            diagnoses.push(Diagnosis {
                issue: "Missing Access-Control-Allow-Origin header".to_string(),
                description: format!(
                    "The request came from origin `{}` but the response carries no \
                     Access-Control-Allow-Origin header, so the browser blocks it.",
                    origin
                ),
                recommendation: "Send Access-Control-Allow-Origin naming the requesting \
                                 origin on every cross-origin response."
                    .to_string(),
                code_example: Some(snippets::code_example("missing-allow-origin", &origin)),
                pattern: None,
                severity: Severity::Critical,
            });
        }

        // Allowed origin present but does not match the requesting origin.
        if let Some(allow) = allow_origin {
            if !origin.is_empty() && allow != "*" && normalize_origin(allow) != origin {
                diagnoses.push(Diagnosis {
                    issue: "Origin mismatch".to_string(),
                    description: format!(
                        "The response allows origin `{}` but the request came from `{}`. \
                         Origins must match exactly, including scheme and port.",
                        allow, origin
                    ),
                    recommendation: "Check the requesting origin against your allow-list \
                                     and echo back the matching value."
                        .to_string(),
                    code_example: Some(snippets::code_example("origin mismatch", &origin)),
                    pattern: None,
                    severity: Severity::Critical,
                });
            }
        }

        // Wildcard origin combined with credentials.
        if allow_origin == Some("*") && response.get(ALLOW_CREDENTIALS) == Some("true") {
            diagnoses.push(Diagnosis {
                issue: "Wildcard origin with credentials".to_string(),
                description: "The response combines Access-Control-Allow-Origin: * with \
                              Access-Control-Allow-Credentials: true. Browsers reject this \
                              combination."
                    .to_string(),
                recommendation: "Echo an explicit origin instead of `*` when credentials \
                                 are allowed."
                    .to_string(),
                code_example: Some(snippets::code_example("wildcard with credentials", &origin)),
                pattern: Some("wildcard-credentials-conflict"),
                severity: Severity::Critical,
            });
        }

        if is_preflight(method, request) {
            if !response.contains(ALLOW_METHODS) {
                diagnoses.push(Diagnosis {
                    issue: "Preflight response lacks Access-Control-Allow-Methods".to_string(),
                    description: "The OPTIONS preflight response does not state which \
                                  methods are allowed, so the browser never sends the \
                                  actual request."
                        .to_string(),
                    recommendation: "List every supported method in \
                                     Access-Control-Allow-Methods on preflight responses."
                        .to_string(),
                    code_example: Some(snippets::code_example("missing allow-methods", &origin)),
                    pattern: None,
                    severity: Severity::Critical,
                });
            }
            if request.contains(REQUEST_HEADERS) && !response.contains(ALLOW_HEADERS) {
                diagnoses.push(Diagnosis {
                    issue: "Requested headers not allowed".to_string(),
                    description: "The preflight asked permission for custom request headers \
                                  but the response carries no Access-Control-Allow-Headers."
                        .to_string(),
                    recommendation: "List the headers the client sends in \
                                     Access-Control-Allow-Headers."
                        .to_string(),
                    code_example: Some(snippets::code_example("missing allow-headers", &origin)),
                    pattern: Some("custom-headers-not-allowed"),
                    severity: Severity::Critical,
                });
            }
        }

        // Catalog scan; skip the match if its id is already represented.
        let input = PatternInput::new(method, request, response);
        if let Some(pattern) = detect_pattern(&input) {
            let represented = diagnoses
                .iter()
                .any(|diagnosis| diagnosis.pattern == Some(pattern.id));
            if !represented {
                diagnoses.push(Diagnosis {
                    issue: pattern.name.to_string(),
                    description: pattern.explanation.to_string(),
                    recommendation: pattern.solution.to_string(),
                    code_example: Some(pattern.code_example.to_string()),
                    pattern: Some(pattern.id),
                    severity: Severity::Warning,
                });
            }
        }

        // Judge the configuration implied by the response headers.
        let snapshot = snapshot_from_response(response);
        for issue in check_security(&snapshot, self.environment) {
            diagnoses.push(Diagnosis {
                issue: issue.title,
                description: issue.description,
                recommendation: issue.recommendation,
                code_example: None,
                pattern: None,
                severity: issue.level,
            });
        }

        diagnoses
    }
}

/// Reconstructs the CORS configuration implied by a set of response headers
pub fn snapshot_from_response(response: &HeaderView) -> CorsConfig {
    CorsConfig {
        origin: response
            .get(ALLOW_ORIGIN)
            .map(|value| AllowedOrigins::Exact(value.to_string())),
        methods: response.get(ALLOW_METHODS).map(split_list),
        allowed_headers: response
            .get(ALLOW_HEADERS)
            .map(|value| split_list(value).into_iter().map(Into::into).collect()),
        exposed_headers: response
            .get(EXPOSE_HEADERS)
            .map(|value| split_list(value).into_iter().map(Into::into).collect()),
        credentials: if response.get(ALLOW_CREDENTIALS) == Some("true") {
            Some(true)
        } else {
            None
        },
        max_age: response.get(MAX_AGE).and_then(|value| value.trim().parse().ok()),
    }
}

/// Diagnoses a header pair with a default (production) analyzer
pub fn analyze_headers(
    request: &HeaderView,
    method: &str,
    response: &HeaderView,
) -> Vec<Diagnosis> {
    Analyzer::default().analyze(request, method, response)
}

/// One property that differs between two configurations
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigMismatch {
    /// Name of the differing property
    pub property: &'static str,
    /// The current value, rendered for display
    pub current: String,
    /// The expected value, rendered for display
    pub expected: String,
}

/// The difference between a current and an expected configuration
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigDiff {
    /// Properties the expected configuration has but the current one lacks
    pub missing: Vec<&'static str>,
    /// Properties present in both but with different values
    pub incorrect: Vec<ConfigMismatch>,
    /// Properties the current configuration has but the expected one lacks
    pub extra: Vec<&'static str>,
    /// Prose summary assembled from the non-empty buckets
    pub summary: String,
}

impl ConfigDiff {
    /// Whether the two configurations matched exactly
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.incorrect.is_empty() && self.extra.is_empty()
    }
}

fn diff_property<T>(
    diff: &mut ConfigDiff,
    property: &'static str,
    current: Option<&T>,
    expected: Option<&T>,
    equal: fn(&T, &T) -> bool,
    render: fn(&T) -> String,
) {
    match (current, expected) {
        (None, Some(_)) => diff.missing.push(property),
        (Some(current), Some(expected)) if !equal(current, expected) => {
            diff.incorrect.push(ConfigMismatch {
                property,
                current: render(current),
                expected: render(expected),
            })
        }
        (Some(_), None) => diff.extra.push(property),
        _ => {}
    }
}

// Order-insensitive, but a length mismatch is a difference even when one
// side is a subset of the other.
fn set_equal<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && b.iter().all(|item| a.contains(item))
}

fn origins_equal(a: &AllowedOrigins, b: &AllowedOrigins) -> bool {
    match (a, b) {
        (AllowedOrigins::List(a), AllowedOrigins::List(b)) => set_equal(a, b),
        _ => a == b,
    }
}

fn render_list<T: ToString>(list: &[T]) -> String {
    list.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compares a current configuration against an expected one
///
/// Array-valued properties compare as sets of equal length; scalar
/// properties compare for equality. A property is "present" iff it is
/// `Some`; there is no separate notion of an explicitly-unset value.
pub fn compare_config(current: &CorsConfig, expected: &CorsConfig) -> ConfigDiff {
    let mut diff = ConfigDiff::default();

    diff_property(
        &mut diff,
        "origin",
        current.origin.as_ref(),
        expected.origin.as_ref(),
        origins_equal,
        ToString::to_string,
    );
    diff_property(
        &mut diff,
        "methods",
        current.methods.as_ref(),
        expected.methods.as_ref(),
        |a, b| set_equal(a, b),
        |list| render_list(list),
    );
    diff_property(
        &mut diff,
        "allowedHeaders",
        current.allowed_headers.as_ref(),
        expected.allowed_headers.as_ref(),
        |a, b| set_equal(a, b),
        |list| render_list(list),
    );
    diff_property(
        &mut diff,
        "exposedHeaders",
        current.exposed_headers.as_ref(),
        expected.exposed_headers.as_ref(),
        |a, b| set_equal(a, b),
        |list| render_list(list),
    );
    diff_property(
        &mut diff,
        "credentials",
        current.credentials.as_ref(),
        expected.credentials.as_ref(),
        |a, b| a == b,
        ToString::to_string,
    );
    diff_property(
        &mut diff,
        "maxAge",
        current.max_age.as_ref(),
        expected.max_age.as_ref(),
        |a, b| a == b,
        ToString::to_string,
    );

    diff.summary = if diff.is_match() {
        "Configurations match exactly".to_string()
    } else {
        let mut parts = Vec::new();
        if !diff.missing.is_empty() {
            parts.push(format!("missing: {}", diff.missing.join(", ")));
        }
        if !diff.incorrect.is_empty() {
            let names: Vec<&str> = diff
                .incorrect
                .iter()
                .map(|mismatch| mismatch.property)
                .collect();
            parts.push(format!("incorrect: {}", names.join(", ")));
        }
        if !diff.extra.is_empty() {
            parts.push(format!("extra: {}", diff.extra.join(", ")));
        }
        format!("Configuration differs ({})", parts.join("; "))
    };

    diff
}

/// Preflight outcome within an [`OriginTestResult`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PreflightOutcome {
    /// Whether the configuration forces browsers to preflight
    pub required: bool,
    /// Whether a preflight against this configuration would succeed
    pub allowed: bool,
}

/// The simulated outcome of a request from a given origin
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OriginTestResult {
    /// Whether the origin would be allowed
    pub allowed: bool,
    /// Why the origin was rejected, when it was
    pub reason: Option<String>,
    /// The response headers the configuration would produce, in canonical
    /// casing
    pub headers: BTreeMap<String, String>,
    /// The preflight verdict
    pub preflight: PreflightOutcome,
}

/// Methods a browser will send without a preflight
const SIMPLE_METHODS: &[&str] = &["GET", "HEAD", "POST"];

/// Simulates how a configuration would answer a request from `origin`
///
/// The resolved allow-origin header carries the literal configured string
/// for an exact origin, the literal tested origin for a list match, and `*`
/// for a wildcard. Credentials invalidate an otherwise-allowed wildcard.
pub fn test_origin(origin: &str, config: &CorsConfig) -> OriginTestResult {
    let normalized = normalize_origin(origin);
    let mut headers = BTreeMap::new();
    let mut reason = None;

    let (mut allowed, origin_header) = match &config.origin {
        None => {
            reason = Some("no origin is configured".to_string());
            (false, None)
        }
        Some(AllowedOrigins::Any) => (true, Some("*".to_string())),
        Some(AllowedOrigins::Disabled) => {
            reason = Some("CORS is disabled for this configuration".to_string());
            (false, None)
        }
        Some(AllowedOrigins::Exact(configured)) => {
            if configured == "*" {
                (true, Some("*".to_string()))
            } else if normalize_origin(configured) == normalized {
                (true, Some(configured.clone()))
            } else {
                reason = Some(format!(
                    "origin `{}` does not match the configured origin `{}`",
                    origin, configured
                ));
                (false, None)
            }
        }
        Some(AllowedOrigins::List(list)) => {
            if !normalized.is_empty()
                && list.iter().any(|entry| normalize_origin(entry) == normalized)
            {
                (true, Some(origin.to_string()))
            } else {
                reason = Some(format!(
                    "origin `{}` is not in the allowed origin list",
                    origin
                ));
                (false, None)
            }
        }
    };

    let credentials = config.credentials == Some(true);

    // Credentials invalidate an otherwise-allowed wildcard decision.
    if credentials && origin_header.as_deref() == Some("*") {
        allowed = false;
        reason = Some("cannot use a wildcard origin with credentials".to_string());
    }

    if allowed {
        if let Some(value) = origin_header {
            let _ = headers.insert("Access-Control-Allow-Origin".to_string(), value);
        }
        if credentials {
            let _ = headers.insert(
                "Access-Control-Allow-Credentials".to_string(),
                "true".to_string(),
            );
        }
        if let Some(methods) = &config.methods {
            if !methods.is_empty() {
                let _ = headers.insert(
                    "Access-Control-Allow-Methods".to_string(),
                    methods.join(", "),
                );
            }
        }
        if let Some(allowed_headers) = &config.allowed_headers {
            if !allowed_headers.is_empty() {
                let _ = headers.insert(
                    "Access-Control-Allow-Headers".to_string(),
                    render_list(allowed_headers),
                );
            }
        }
        if let Some(exposed_headers) = &config.exposed_headers {
            if !exposed_headers.is_empty() {
                let _ = headers.insert(
                    "Access-Control-Expose-Headers".to_string(),
                    render_list(exposed_headers),
                );
            }
        }
        if let Some(max_age) = config.max_age {
            let _ = headers.insert("Access-Control-Max-Age".to_string(), max_age.to_string());
        }
    }

    let required = config.methods.as_ref().map_or(false, |methods| {
        methods.iter().any(|method| {
            !SIMPLE_METHODS
                .iter()
                .any(|simple| method.eq_ignore_ascii_case(simple))
        })
    }) || config
        .allowed_headers
        .as_ref()
        .map_or(false, |headers| !headers.is_empty());

    let preflight_allowed = allowed
        && (!required
            || (headers.contains_key("Access-Control-Allow-Methods")
                && headers.contains_key("Access-Control-Allow-Headers")));

    OriginTestResult {
        allowed,
        reason,
        headers,
        preflight: PreflightOutcome {
            required,
            allowed: preflight_allowed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(pairs: &[(&str, &str)]) -> HeaderView {
        HeaderView::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn snapshot_reads_all_response_headers() {
        let response = view(&[
            ("access-control-allow-origin", "https://app.example.com"),
            ("access-control-allow-methods", "GET, POST"),
            ("access-control-allow-headers", "Content-Type, X-Custom"),
            ("access-control-expose-headers", "X-Request-Id"),
            ("access-control-allow-credentials", "true"),
            ("access-control-max-age", "600"),
        ]);
        let snapshot = snapshot_from_response(&response);
        assert_eq!(
            snapshot.origin,
            Some(AllowedOrigins::Exact("https://app.example.com".to_string()))
        );
        assert_eq!(
            snapshot.methods,
            Some(vec!["GET".to_string(), "POST".to_string()])
        );
        assert_eq!(snapshot.credentials, Some(true));
        assert_eq!(snapshot.max_age, Some(600));
    }

    #[test]
    fn snapshot_of_empty_response_is_empty() {
        assert_eq!(snapshot_from_response(&HeaderView::new()), CorsConfig::default());
    }

    #[test]
    fn snapshot_ignores_unparseable_max_age() {
        let response = view(&[("access-control-max-age", "soon")]);
        assert_eq!(snapshot_from_response(&response).max_age, None);
    }

    #[test]
    fn analysis_flags_missing_allow_origin_as_critical() {
        let request = view(&[("origin", "https://example.com")]);
        let diagnoses = analyze_headers(&request, "GET", &HeaderView::new());
        assert!(diagnoses.iter().any(|d| {
            d.severity == Severity::Critical && d.issue.contains("Missing")
        }));
    }

    #[test]
    fn analysis_flags_origin_mismatch() {
        let request = view(&[("origin", "https://app.example.com")]);
        let response = view(&[("access-control-allow-origin", "https://other.example.com")]);
        let diagnoses = analyze_headers(&request, "GET", &response);
        assert!(diagnoses
            .iter()
            .any(|d| d.severity == Severity::Critical && d.issue == "Origin mismatch"));
    }

    #[test]
    fn mismatch_tolerates_case_and_trailing_slash() {
        let request = view(&[("origin", "HTTPS://App.Example.com")]);
        let response = view(&[("access-control-allow-origin", "https://app.example.com/")]);
        let diagnoses = analyze_headers(&request, "GET", &response);
        assert!(!diagnoses.iter().any(|d| d.issue == "Origin mismatch"));
    }

    #[test]
    fn wildcard_credentials_tagged_with_pattern_id_once() {
        let request = view(&[("origin", "https://app.example.com")]);
        let response = view(&[
            ("access-control-allow-origin", "*"),
            ("access-control-allow-credentials", "true"),
        ]);
        let diagnoses = analyze_headers(&request, "GET", &response);
        let tagged: Vec<_> = diagnoses
            .iter()
            .filter(|d| d.pattern == Some("wildcard-credentials-conflict"))
            .collect();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].severity, Severity::Critical);
    }

    #[test]
    fn security_findings_are_appended_with_their_severity() {
        let request = view(&[("origin", "https://app.example.com")]);
        let response = view(&[
            ("access-control-allow-origin", "*"),
            ("access-control-allow-credentials", "true"),
        ]);
        let diagnoses = analyze_headers(&request, "GET", &response);
        // Rule 1 (wildcard in production) surfaces as a warning after the
        // ad hoc criticals.
        assert!(diagnoses
            .iter()
            .any(|d| d.severity == Severity::Warning && d.issue.contains("production")));
    }

    #[test]
    fn analysis_of_empty_inputs_is_empty() {
        assert!(analyze_headers(&HeaderView::new(), "GET", &HeaderView::new()).is_empty());
    }

    #[test]
    fn analysis_is_idempotent() {
        let request = view(&[
            ("origin", "https://app.example.com"),
            ("access-control-request-headers", "x-custom"),
        ]);
        let response = view(&[]);
        let first = analyze_headers(&request, "OPTIONS", &response);
        let second = analyze_headers(&request, "OPTIONS", &response);
        assert_eq!(first, second);
    }

    #[test]
    fn analysis_accepts_unusual_methods() {
        let request = view(&[("origin", "https://app.example.com")]);
        let _ = analyze_headers(&request, "BREW", &HeaderView::new());
        let _ = analyze_headers(&request, "", &HeaderView::new());
    }

    #[test]
    fn identical_configs_diff_to_a_match() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("https://app.example.com".to_string())),
            methods: Some(vec!["GET".to_string(), "POST".to_string()]),
            credentials: Some(true),
            ..CorsConfig::default()
        };
        let diff = compare_config(&config, &config);
        assert!(diff.is_match());
        assert_eq!(diff.summary, "Configurations match exactly");
    }

    #[test]
    fn diff_buckets_missing_incorrect_and_extra() {
        let current = CorsConfig {
            methods: Some(vec!["GET".to_string()]),
            max_age: Some(600),
            ..CorsConfig::default()
        };
        let expected = CorsConfig {
            origin: Some(AllowedOrigins::Exact("https://app.example.com".to_string())),
            methods: Some(vec!["GET".to_string(), "POST".to_string()]),
            ..CorsConfig::default()
        };
        let diff = compare_config(&current, &expected);
        assert_eq!(diff.missing, vec!["origin"]);
        assert_eq!(diff.incorrect.len(), 1);
        assert_eq!(diff.incorrect[0].property, "methods");
        assert_eq!(diff.extra, vec!["maxAge"]);
        assert!(diff.summary.contains("missing: origin"));
    }

    #[test]
    fn list_properties_compare_as_sets() {
        let current = CorsConfig {
            methods: Some(vec!["POST".to_string(), "GET".to_string()]),
            ..CorsConfig::default()
        };
        let expected = CorsConfig {
            methods: Some(vec!["GET".to_string(), "POST".to_string()]),
            ..CorsConfig::default()
        };
        assert!(compare_config(&current, &expected).is_match());
    }

    #[test]
    fn subset_with_shorter_length_is_incorrect() {
        let current = CorsConfig {
            methods: Some(vec!["GET".to_string()]),
            ..CorsConfig::default()
        };
        let expected = CorsConfig {
            methods: Some(vec!["GET".to_string(), "POST".to_string()]),
            ..CorsConfig::default()
        };
        let diff = compare_config(&current, &expected);
        assert_eq!(diff.incorrect.len(), 1);
    }

    #[test]
    fn wildcard_origin_always_allows() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("*".to_string())),
            ..CorsConfig::default()
        };
        let result = test_origin("https://anywhere.example.com", &config);
        assert!(result.allowed);
        assert_eq!(
            result.headers.get("Access-Control-Allow-Origin").map(String::as_str),
            Some("*")
        );
    }

    #[test]
    fn exact_origin_echoes_the_configured_string() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("https://App.Example.com".to_string())),
            ..CorsConfig::default()
        };
        let result = test_origin("https://app.example.com/", &config);
        assert!(result.allowed);
        // The literal configured value, not the tested origin.
        assert_eq!(
            result.headers.get("Access-Control-Allow-Origin").map(String::as_str),
            Some("https://App.Example.com")
        );
    }

    #[test]
    fn list_match_echoes_the_tested_origin() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::List(vec![
                "https://example.com".to_string(),
                "https://app.example.com".to_string(),
            ])),
            ..CorsConfig::default()
        };
        let result = test_origin("https://app.example.com", &config);
        assert!(result.allowed);
        assert_eq!(
            result.headers.get("Access-Control-Allow-Origin").map(String::as_str),
            Some("https://app.example.com")
        );
    }

    #[test]
    fn rejected_origin_carries_a_reason() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::List(vec!["https://example.com".to_string()])),
            ..CorsConfig::default()
        };
        let result = test_origin("https://evil.example.com", &config);
        assert!(!result.allowed);
        assert!(result.reason.is_some());
        assert!(result.headers.is_empty());
    }

    #[test]
    fn credentials_invalidate_a_wildcard() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("*".to_string())),
            credentials: Some(true),
            ..CorsConfig::default()
        };
        let result = test_origin("https://app.example.com", &config);
        assert!(!result.allowed);
        assert!(result
            .reason
            .as_deref()
            .map_or(false, |reason| reason.contains("wildcard")));
    }

    #[test]
    fn credentials_header_added_for_explicit_origins() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Exact("https://app.example.com".to_string())),
            credentials: Some(true),
            ..CorsConfig::default()
        };
        let result = test_origin("https://app.example.com", &config);
        assert!(result.allowed);
        assert_eq!(
            result
                .headers
                .get("Access-Control-Allow-Credentials")
                .map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn preflight_required_for_non_simple_methods_or_headers() {
        let simple = CorsConfig {
            origin: Some(AllowedOrigins::Any),
            methods: Some(vec!["GET".to_string(), "POST".to_string()]),
            ..CorsConfig::default()
        };
        assert!(!test_origin("https://a.example.com", &simple).preflight.required);

        let non_simple = CorsConfig {
            methods: Some(vec!["GET".to_string(), "DELETE".to_string()]),
            ..simple.clone()
        };
        assert!(test_origin("https://a.example.com", &non_simple).preflight.required);

        let with_headers = CorsConfig {
            allowed_headers: Some(vec!["X-Custom".into()]),
            ..simple
        };
        assert!(test_origin("https://a.example.com", &with_headers).preflight.required);
    }

    #[test]
    fn preflight_allowed_needs_both_headers_when_required() {
        let incomplete = CorsConfig {
            origin: Some(AllowedOrigins::Any),
            methods: Some(vec!["DELETE".to_string()]),
            ..CorsConfig::default()
        };
        let result = test_origin("https://a.example.com", &incomplete);
        assert!(result.allowed);
        assert!(result.preflight.required);
        assert!(!result.preflight.allowed);

        let complete = CorsConfig {
            allowed_headers: Some(vec!["Content-Type".into()]),
            ..incomplete
        };
        let result = test_origin("https://a.example.com", &complete);
        assert!(result.preflight.allowed);
    }

    #[test]
    fn max_age_serialized_as_decimal() {
        let config = CorsConfig {
            origin: Some(AllowedOrigins::Any),
            max_age: Some(86400),
            ..CorsConfig::default()
        };
        let result = test_origin("https://a.example.com", &config);
        assert_eq!(
            result.headers.get("Access-Control-Max-Age").map(String::as_str),
            Some("86400")
        );
    }
}

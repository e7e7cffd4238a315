//! The catalog of known CORS failure patterns
//!
//! Each entry is a tagged record pairing a pure detector with canned
//! explanation, fix, and example text. The catalog is a fixed sequence
//! evaluated in declaration order; [`detect_pattern`] returns the first
//! match. Detectors are total functions: malformed header values are a
//! non-match, never a failure.

use crate::headers::names::{
    ALLOW_CREDENTIALS, ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, COOKIE, ORIGIN,
    REQUEST_HEADERS,
};
use crate::headers::{is_preflight, normalize_origin, parse_origin_url, HeaderView};

/// The header pair a detector is evaluated over
#[derive(Clone, Copy, Debug)]
pub struct PatternInput<'a> {
    /// The request method, verbatim
    pub method: &'a str,
    /// The request headers
    pub request: &'a HeaderView,
    /// The response headers as they would be sent
    pub response: &'a HeaderView,
}

impl<'a> PatternInput<'a> {
    /// Bundles a request/response header pair for catalog evaluation
    pub fn new(method: &'a str, request: &'a HeaderView, response: &'a HeaderView) -> Self {
        PatternInput {
            method,
            request,
            response,
        }
    }
}

/// A named CORS failure signature with a canned explanation and fix
pub struct ErrorPattern {
    /// Unique, stable identifier for the pattern
    pub id: &'static str,
    /// Human-readable pattern name
    pub name: &'static str,
    /// Pure predicate deciding whether the header pair exhibits the pattern
    pub detector: fn(&PatternInput<'_>) -> bool,
    /// What went wrong, in prose
    pub explanation: &'static str,
    /// How to fix it, in prose
    pub solution: &'static str,
    /// An illustrative response-header snippet, static per entry
    pub code_example: &'static str,
}

fn wildcard_credentials(input: &PatternInput<'_>) -> bool {
    input.response.get(ALLOW_ORIGIN) == Some("*")
        && input.response.get(ALLOW_CREDENTIALS) == Some("true")
}

fn multiple_origins(input: &PatternInput<'_>) -> bool {
    input
        .response
        .get(ALLOW_ORIGIN)
        .map_or(false, |value| value.contains(','))
}

fn preflight_only_failure(input: &PatternInput<'_>) -> bool {
    is_preflight(input.method, input.request)
        && (!input.response.contains(ALLOW_ORIGIN) || !input.response.contains(ALLOW_METHODS))
}

fn custom_headers_not_allowed(input: &PatternInput<'_>) -> bool {
    is_preflight(input.method, input.request)
        && input.request.contains(REQUEST_HEADERS)
        && !input.response.contains(ALLOW_HEADERS)
}

fn missing_allow_origin(input: &PatternInput<'_>) -> bool {
    input.request.contains(ORIGIN) && !input.response.contains(ALLOW_ORIGIN)
}

fn missing_allow_headers(input: &PatternInput<'_>) -> bool {
    is_preflight(input.method, input.request)
        && input.request.contains(REQUEST_HEADERS)
        && !input.response.contains(ALLOW_HEADERS)
}

fn missing_allow_methods(input: &PatternInput<'_>) -> bool {
    is_preflight(input.method, input.request) && !input.response.contains(ALLOW_METHODS)
}

fn credentials_mismatch(input: &PatternInput<'_>) -> bool {
    input.request.contains(COOKIE) && input.response.get(ALLOW_CREDENTIALS) != Some("true")
}

fn origin_null_blocked(input: &PatternInput<'_>) -> bool {
    let origin = match input.request.get(ORIGIN) {
        Some(origin) => origin,
        None => return false,
    };
    normalize_origin(origin) == "null"
        && input
            .response
            .get(ALLOW_ORIGIN)
            .map_or(true, |allow| allow != "null" && allow != "*")
}

fn port_mismatch(input: &PatternInput<'_>) -> bool {
    let origin = match input.request.get(ORIGIN) {
        Some(origin) => origin,
        None => return false,
    };
    let allow = match input.response.get(ALLOW_ORIGIN) {
        Some(allow) => allow,
        None => return false,
    };
    if allow == "*" {
        return false;
    }
    match (parse_origin_url(origin), parse_origin_url(allow)) {
        (Some(origin), Some(allow)) => {
            origin.host_str().is_some()
                && origin.host_str() == allow.host_str()
                && origin.port() != allow.port()
        }
        _ => false,
    }
}

/// The fixed pattern catalog, in evaluation order
///
/// Ordering is part of the contract: when several detectors would match,
/// the earliest entry wins.
pub static CATALOG: &[ErrorPattern] = &[
    ErrorPattern {
        id: "wildcard-credentials-conflict",
        name: "Wildcard origin combined with credentials",
        detector: wildcard_credentials,
        explanation: "The response allows any origin (`*`) while also allowing credentials. \
                      Browsers reject this combination: a credentialed response must name an \
                      explicit origin.",
        solution: "Echo the specific requesting origin instead of `*` whenever \
                   Access-Control-Allow-Credentials is true, and send `Vary: Origin`.",
        code_example: "Access-Control-Allow-Origin: https://app.example.com\n\
                       Access-Control-Allow-Credentials: true\n\
                       Vary: Origin",
    },
    ErrorPattern {
        id: "multiple-origins-misconfiguration",
        name: "Multiple origins in Access-Control-Allow-Origin",
        detector: multiple_origins,
        explanation: "Access-Control-Allow-Origin contains a comma-separated list. The header \
                      accepts exactly one origin (or `*`); browsers treat a list as invalid \
                      and block the response.",
        solution: "Check the requesting origin against your allow-list on the server and echo \
                   back the single matching value.",
        code_example: "Access-Control-Allow-Origin: https://app.example.com\n\
                       Vary: Origin",
    },
    ErrorPattern {
        id: "preflight-only-failure",
        name: "Incomplete preflight response",
        detector: preflight_only_failure,
        explanation: "The preflight (OPTIONS) response is missing Access-Control-Allow-Origin \
                      or Access-Control-Allow-Methods, so the browser never attempts the \
                      actual request.",
        solution: "Answer OPTIONS requests with both the allowed origin and the allowed \
                   methods before any authentication or routing shortcuts reject them.",
        code_example: "Access-Control-Allow-Origin: https://app.example.com\n\
                       Access-Control-Allow-Methods: GET, POST, PUT, DELETE\n\
                       Access-Control-Max-Age: 86400",
    },
    ErrorPattern {
        id: "custom-headers-not-allowed",
        name: "Requested headers not allowed",
        detector: custom_headers_not_allowed,
        explanation: "The preflight asked permission for custom request headers, but the \
                      response carries no Access-Control-Allow-Headers, so the browser \
                      refuses to send them.",
        solution: "List every header the client sends (or echo \
                   Access-Control-Request-Headers) in Access-Control-Allow-Headers.",
        code_example: "Access-Control-Allow-Headers: Content-Type, Authorization, X-Custom",
    },
    ErrorPattern {
        id: "missing-allow-origin",
        name: "Missing Access-Control-Allow-Origin",
        detector: missing_allow_origin,
        explanation: "The request declared an Origin but the response has no \
                      Access-Control-Allow-Origin header at all, so the browser blocks the \
                      response from being read.",
        solution: "Send Access-Control-Allow-Origin naming the requesting origin on every \
                   cross-origin response, including error responses.",
        code_example: "Access-Control-Allow-Origin: https://app.example.com\n\
                       Vary: Origin",
    },
    ErrorPattern {
        id: "missing-allow-headers",
        name: "Missing Access-Control-Allow-Headers",
        detector: missing_allow_headers,
        explanation: "A preflight requested permission for additional headers but the \
                      response does not say which headers are allowed.",
        solution: "Add an Access-Control-Allow-Headers header to preflight responses \
                   covering every header the client will send.",
        code_example: "Access-Control-Allow-Headers: Content-Type, Authorization",
    },
    ErrorPattern {
        id: "missing-allow-methods",
        name: "Missing Access-Control-Allow-Methods",
        detector: missing_allow_methods,
        explanation: "A preflight response must state which methods the origin may use, but \
                      Access-Control-Allow-Methods is absent.",
        solution: "Add Access-Control-Allow-Methods to preflight responses listing every \
                   method the route supports.",
        code_example: "Access-Control-Allow-Methods: GET, POST, PUT, DELETE, OPTIONS",
    },
    ErrorPattern {
        id: "credentials-mismatch",
        name: "Cookies sent without credential support",
        detector: credentials_mismatch,
        explanation: "The request carried cookies but the response does not set \
                      Access-Control-Allow-Credentials to `true`, so the browser discards \
                      the credentialed response.",
        solution: "Set Access-Control-Allow-Credentials: true and name an explicit allowed \
                   origin, or stop sending credentials from the client.",
        code_example: "Access-Control-Allow-Origin: https://app.example.com\n\
                       Access-Control-Allow-Credentials: true",
    },
    ErrorPattern {
        id: "origin-null-blocked",
        name: "Null origin blocked",
        detector: origin_null_blocked,
        explanation: "The request came from a `null` origin (sandboxed iframe, `file://` \
                      page, or redirect) and the response does not allow it.",
        solution: "Either serve the page from a real origin, or explicitly allow `null`, \
                   bearing in mind that allowing `null` is itself risky.",
        code_example: "Access-Control-Allow-Origin: null",
    },
    ErrorPattern {
        id: "port-mismatch",
        name: "Port mismatch between origin and allowed origin",
        detector: port_mismatch,
        explanation: "The allowed origin names the same host as the request origin but a \
                      different port. Ports are part of the origin tuple, so the values do \
                      not match.",
        solution: "Include the exact port the client runs on in the configured origin.",
        code_example: "Access-Control-Allow-Origin: http://localhost:3000",
    },
];

/// Scans the catalog in order and returns the first matching pattern
pub fn detect_pattern(input: &PatternInput<'_>) -> Option<&'static ErrorPattern> {
    CATALOG.iter().find(|pattern| (pattern.detector)(input))
}

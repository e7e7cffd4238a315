//! Header normalization and the CORS preflight classifier
//!
//! Everything downstream of this module works on a [`HeaderView`]: a
//! case-insensitive, single-valued snapshot of a raw header bag. Construction
//! is lenient by contract: malformed entries are dropped, never reported.

use std::collections::HashMap;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;
use std::str::FromStr;

#[cfg(feature = "serialization")]
use serde_derive::{Deserialize, Serialize};
use unicase::UniCase;
use url::Url;

/// Lower-cased names of the request and response headers that participate in
/// the CORS protocol.
pub mod names {
    /// The `Origin` request header.
    pub const ORIGIN: &str = "origin";
    /// The `Cookie` request header.
    pub const COOKIE: &str = "cookie";
    /// The `Access-Control-Request-Method` preflight request header.
    pub const REQUEST_METHOD: &str = "access-control-request-method";
    /// The `Access-Control-Request-Headers` preflight request header.
    pub const REQUEST_HEADERS: &str = "access-control-request-headers";
    /// The `Access-Control-Allow-Origin` response header.
    pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
    /// The `Access-Control-Allow-Methods` response header.
    pub const ALLOW_METHODS: &str = "access-control-allow-methods";
    /// The `Access-Control-Allow-Headers` response header.
    pub const ALLOW_HEADERS: &str = "access-control-allow-headers";
    /// The `Access-Control-Allow-Credentials` response header.
    pub const ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    /// The `Access-Control-Expose-Headers` response header.
    pub const EXPOSE_HEADERS: &str = "access-control-expose-headers";
    /// The `Access-Control-Max-Age` response header.
    pub const MAX_AGE: &str = "access-control-max-age";
}

/// A case insensitive header name
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct HeaderFieldName(
    #[cfg_attr(feature = "serialization", serde(with = "unicase_serde::unicase"))] UniCase<String>,
);

impl Deref for HeaderFieldName {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl fmt::Display for HeaderFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'a> From<&'a str> for HeaderFieldName {
    fn from(s: &'a str) -> Self {
        HeaderFieldName(From::from(s))
    }
}

impl From<String> for HeaderFieldName {
    fn from(s: String) -> Self {
        HeaderFieldName(From::from(s))
    }
}

impl FromStr for HeaderFieldName {
    type Err = <String as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HeaderFieldName(FromStr::from_str(s)?))
    }
}

/// A case-insensitive, single-valued view over a raw header bag
///
/// Keys are stored lower-cased; repeated names keep their first value
/// (multi-valued headers collapse to index 0); entries with empty names are
/// skipped. There are no public mutators; a view is immutable once built.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeaderView {
    map: HashMap<String, String>,
}

impl HeaderView {
    /// An empty view, representing a message that carried no headers
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a view from name/value pairs
    ///
    /// Never fails: malformed entries are omitted rather than reported.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (name, value) in pairs {
            let name = name.as_ref().trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            let _ = map
                .entry(name)
                .or_insert_with(|| value.as_ref().to_string());
        }
        HeaderView { map }
    }

    /// Case-insensitive lookup of a single header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.trim().to_ascii_lowercase()).map(String::as_str)
    }

    /// Whether a header is present, case-insensitively
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The number of distinct headers in the view
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the view holds no headers at all
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderView {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl From<&HashMap<String, String>> for HeaderView {
    fn from(headers: &HashMap<String, String>) -> Self {
        Self::from_pairs(headers.iter())
    }
}

/// Canonicalizes a raw `Origin` header value
///
/// Trims surrounding whitespace, lower-cases, and strips one trailing `/`.
/// The empty string represents "no origin supplied". Two origins are equal
/// iff their normalized forms are equal.
pub fn normalize_origin(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    match trimmed.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => trimmed,
    }
}

/// Decides whether a request is a CORS preflight
///
/// True iff the method is exactly `OPTIONS` and at least one of the
/// `Access-Control-Request-*` headers is present. Any other method is never
/// a preflight, whatever headers it carries.
pub fn is_preflight(method: &str, request: &HeaderView) -> bool {
    method == "OPTIONS"
        && (request.contains(names::REQUEST_METHOD) || request.contains(names::REQUEST_HEADERS))
}

/// Parses an origin-shaped string into a [`Url`], if it is one
///
/// Junk input (including `"null"` and `"*"`) yields `None` rather than an
/// error; detectors treat that as "no signal".
pub fn parse_origin_url(raw: &str) -> Option<Url> {
    Url::parse(raw.trim()).ok()
}

/// Splits a comma-separated header value into trimmed, non-empty items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

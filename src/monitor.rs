//! Passive free-text error observation
//!
//! A host can feed arbitrary error messages (a browser console line, a
//! proxy log record) into the monitor. Messages that look CORS-related are
//! analyzed by keyword and turned into an [`ErrorReport`], deliberately a
//! looser shape than [`Diagnosis`](crate::Diagnosis), since there are no
//! headers to inspect. The monitor owns its own lifecycle and its own
//! bounded report history; it shares nothing with the analyzer beyond the
//! keyword taxonomy.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;
#[cfg(feature = "serialization")]
use serde_derive::Serialize;

use crate::history::DEFAULT_CAPACITY;

/// Substrings that mark a free-text message as CORS-related
const RELEVANCE: &[&str] = &["cors", "cross-origin", "blocked"];

struct Keyword {
    needles: &'static [&'static str],
    cause: &'static str,
    recommendation: &'static str,
}

/// Keyword taxonomy mapping message fragments to likely causes
const TAXONOMY: &[Keyword] = &[
    Keyword {
        needles: &["preflight", "options"],
        cause: "A preflight (OPTIONS) request was rejected before the actual request ran",
        recommendation: "Answer OPTIONS requests with Access-Control-Allow-Methods and \
                         Access-Control-Allow-Headers",
    },
    Keyword {
        needles: &["credential", "cookie"],
        cause: "Credentials were sent but the server does not allow credentialed \
                cross-origin requests",
        recommendation: "Set Access-Control-Allow-Credentials: true and name an explicit \
                         allowed origin",
    },
    Keyword {
        needles: &["wildcard", "'*'", "\"*\""],
        cause: "A wildcard allowed origin is being combined with something that requires \
                an explicit origin",
        recommendation: "Replace `*` with the specific requesting origin",
    },
    Keyword {
        needles: &["header"],
        cause: "A request header is not covered by Access-Control-Allow-Headers",
        recommendation: "List every custom header the client sends in \
                         Access-Control-Allow-Headers",
    },
    Keyword {
        needles: &["origin"],
        cause: "The server did not allow the requesting origin",
        recommendation: "Add the requesting origin to the server's allowed origins",
    },
];

/// A free-text analysis record produced by the monitor
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct ErrorReport {
    /// The observed message, verbatim
    pub message: String,
    /// Likely causes inferred from keywords
    pub possible_causes: Vec<String>,
    /// Matching recommendations
    pub recommendations: Vec<String>,
    /// When the message was observed
    pub timestamp: DateTime<Utc>,
}

/// Observes free-text error messages for CORS signatures
pub struct ErrorMonitor {
    active: bool,
    reports: Vec<ErrorReport>,
    capacity: usize,
    callback: Option<Box<dyn Fn(&ErrorReport) + Send>>,
}

impl fmt::Debug for ErrorMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMonitor")
            .field("active", &self.active)
            .field("reports", &self.reports.len())
            .field("capacity", &self.capacity)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Default for ErrorMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ErrorMonitor {
    /// A monitor retaining at most `capacity` reports, initially started
    pub fn new(capacity: usize) -> Self {
        ErrorMonitor {
            active: true,
            reports: Vec::new(),
            capacity: capacity.max(1),
            callback: None,
        }
    }

    /// Registers a callback invoked for every produced report
    pub fn on_report<F>(&mut self, callback: F)
    where
        F: Fn(&ErrorReport) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Resumes observation
    pub fn start(&mut self) {
        self.active = true;
    }

    /// Suspends observation; messages are ignored until restarted
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Whether the monitor is currently observing
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds one free-text message to the monitor
    ///
    /// Returns a report when the message looks CORS-related and the monitor
    /// is active, `None` otherwise.
    pub fn observe(&mut self, message: &str) -> Option<ErrorReport> {
        if !self.active {
            return None;
        }
        let lowered = message.to_lowercase();
        if !RELEVANCE.iter().any(|needle| lowered.contains(needle)) {
            return None;
        }

        let mut possible_causes = Vec::new();
        let mut recommendations = Vec::new();
        for keyword in TAXONOMY {
            if keyword.needles.iter().any(|needle| lowered.contains(needle)) {
                possible_causes.push(keyword.cause.to_string());
                recommendations.push(keyword.recommendation.to_string());
            }
        }
        if possible_causes.is_empty() {
            possible_causes
                .push("The browser blocked a cross-origin request".to_string());
            recommendations.push(
                "Compare the request's Origin header with the response's \
                 Access-Control-Allow-* headers"
                    .to_string(),
            );
        }

        let report = ErrorReport {
            message: message.to_string(),
            possible_causes,
            recommendations,
            timestamp: Utc::now(),
        };

        debug!("CORS-related message observed: {}", message);
        self.reports.push(report.clone());
        if self.reports.len() > self.capacity {
            let _ = self.reports.remove(0);
        }
        if let Some(callback) = &self.callback {
            callback(&report);
        }
        Some(report)
    }

    /// Reports observed so far, oldest first
    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }

    /// Drops every retained report
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

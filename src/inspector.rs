//! Request-interception collaborator
//!
//! The host (an HTTP middleware, a test harness) opens an [`Exchange`] per
//! request and concludes it once with the response headers it is about to
//! send. The inspector runs the analyzer at most once per exchange, routes
//! non-empty results to the ledger and the log facade, and never panics
//! into the host pipeline.
//!
//! There is no process-wide singleton: the ledger is owned by the
//! inspector, which is owned by whoever composes the host.

use log::{debug, warn};

use crate::analyzer::Analyzer;
use crate::headers::HeaderView;
use crate::history::{ErrorHistory, DEFAULT_CAPACITY};
use crate::security::Environment;
use crate::Diagnosis;

/// One request being observed, concluded at most once
#[derive(Clone, Debug)]
pub struct Exchange {
    /// The route the request targeted
    pub route: String,
    /// The request method
    pub method: String,
    /// The request headers as received
    pub request: HeaderView,
    analyzed: bool,
}

impl Exchange {
    /// Whether this exchange has already been analyzed
    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }
}

/// Observes request/response pairs and feeds the ledger
#[derive(Debug)]
pub struct Inspector {
    analyzer: Analyzer,
    history: ErrorHistory,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(Environment::default(), DEFAULT_CAPACITY)
    }
}

impl Inspector {
    /// An inspector with the given environment and ledger capacity
    pub fn new(environment: Environment, capacity: usize) -> Self {
        Inspector {
            analyzer: Analyzer::new(environment),
            history: ErrorHistory::new(capacity),
        }
    }

    /// Opens an exchange for an incoming request
    pub fn begin(&self, route: &str, method: &str, request: HeaderView) -> Exchange {
        Exchange {
            route: route.to_string(),
            method: method.to_string(),
            request,
            analyzed: false,
        }
    }

    /// Concludes an exchange with the response headers about to be sent
    ///
    /// Analysis runs at most once per exchange, however many times the host
    /// invokes its response-writing path; repeat calls return an empty list.
    /// Non-empty results are recorded in the ledger and logged.
    pub fn conclude(&mut self, exchange: &mut Exchange, response: &HeaderView) -> Vec<Diagnosis> {
        if exchange.analyzed {
            return Vec::new();
        }
        exchange.analyzed = true;

        let diagnoses = self
            .analyzer
            .analyze(&exchange.request, &exchange.method, response);
        if !diagnoses.is_empty() {
            let origin = exchange.request.get("origin").unwrap_or("");
            warn!(
                "{} CORS issue(s) for {} {} from origin `{}`",
                diagnoses.len(),
                exchange.method,
                exchange.route,
                origin,
            );
            for diagnosis in &diagnoses {
                debug!("[{}] {}", diagnosis.severity, diagnosis.issue);
            }
            self.history
                .record(&exchange.route, &exchange.method, origin, diagnoses.clone());
        }
        diagnoses
    }

    /// The diagnosis ledger
    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }

    /// Mutable access to the ledger, e.g. to clear it
    pub fn history_mut(&mut self) -> &mut ErrorHistory {
        &mut self.history
    }
}

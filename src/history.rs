//! Bounded, deduplicating store of past diagnoses
//!
//! Entries are keyed by (route, method, normalized origin, diagnosis
//! signature). A repeat occurrence refreshes the timestamp and bumps the
//! count instead of inserting; overflow evicts the oldest entry by
//! insertion order, true circular-buffer style.
//!
//! The ledger assumes single-threaded access. It is `Send`, but callers
//! sharing it across threads must wrap it in their own lock.

use chrono::{DateTime, Utc};
#[cfg(feature = "serialization")]
use serde_derive::Serialize;

use crate::headers::normalize_origin;
use crate::Diagnosis;

/// Default number of entries a ledger retains
pub const DEFAULT_CAPACITY: usize = 50;

/// One recorded CORS failure, owned exclusively by the ledger
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct ErrorEntry {
    /// When the failure was last observed
    pub timestamp: DateTime<Utc>,
    /// The route the failing request targeted
    pub route: String,
    /// The request method
    pub method: String,
    /// The normalized requesting origin
    pub origin: String,
    /// The diagnoses produced for the failure
    pub diagnoses: Vec<Diagnosis>,
    /// How many times this failure has been observed
    pub count: u32,
}

/// The bounded, deduplicating diagnosis ledger
#[derive(Debug)]
pub struct ErrorHistory {
    entries: Vec<ErrorEntry>,
    capacity: usize,
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Canonicalized projection used for dedup: the sorted list of
/// (issue, description, recommendation) triples. Two diagnosis lists are
/// "the same error" iff their projections are equal.
fn signature(diagnoses: &[Diagnosis]) -> Vec<(String, String, String)> {
    let mut triples: Vec<_> = diagnoses
        .iter()
        .map(|diagnosis| {
            (
                diagnosis.issue.clone(),
                diagnosis.description.clone(),
                diagnosis.recommendation.clone(),
            )
        })
        .collect();
    triples.sort();
    triples
}

impl ErrorHistory {
    /// A ledger retaining at most `capacity` entries (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        ErrorHistory {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Records a diagnosis list for a (route, method, origin) tuple
    ///
    /// A repeat of an already-recorded failure refreshes its timestamp and
    /// increments its count in place; a new failure is appended, evicting
    /// the oldest entry when the ledger is full.
    pub fn record(&mut self, route: &str, method: &str, origin: &str, diagnoses: Vec<Diagnosis>) {
        let origin = normalize_origin(origin);
        let sig = signature(&diagnoses);

        if let Some(existing) = self.entries.iter_mut().find(|entry| {
            entry.route == route
                && entry.method == method
                && entry.origin == origin
                && signature(&entry.diagnoses) == sig
        }) {
            existing.count += 1;
            existing.timestamp = Utc::now();
            return;
        }

        self.entries.push(ErrorEntry {
            timestamp: Utc::now(),
            route: route.to_string(),
            method: method.to_string(),
            origin,
            diagnoses,
            count: 1,
        });
        if self.entries.len() > self.capacity {
            let _ = self.entries.remove(0);
        }
    }

    /// All entries, most recently observed first
    pub fn entries(&self) -> Vec<ErrorEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of distinct failures currently retained
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

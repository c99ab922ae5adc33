use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::{BackendError, LauncherBackend};
use crate::model::{Domain, IconRef, RawResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Search,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Backend order is already relevance order.
    Verbatim,
    /// Applications first, stable within each group.
    ApplicationsFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainRoute {
    pub capability: Capability,
    pub needs_index: bool,
    pub ranking: Ranking,
    pub fetch_icons: bool,
}

const ROUTES: [(Domain, DomainRoute); 3] = [
    (
        Domain::Applications,
        DomainRoute {
            capability: Capability::Search,
            needs_index: true,
            ranking: Ranking::Verbatim,
            fetch_icons: true,
        },
    ),
    (
        Domain::Files,
        DomainRoute {
            capability: Capability::Search,
            needs_index: true,
            ranking: Ranking::ApplicationsFirst,
            fetch_icons: true,
        },
    ),
    (
        Domain::Assistant,
        DomainRoute {
            capability: Capability::Ask,
            needs_index: false,
            ranking: Ranking::Verbatim,
            fetch_icons: false,
        },
    ),
];

pub fn route(domain: Domain) -> DomainRoute {
    ROUTES
        .iter()
        .find(|(candidate, _)| *candidate == domain)
        .map(|(_, route)| *route)
        .unwrap_or(DomainRoute {
            capability: Capability::Search,
            needs_index: false,
            ranking: Ranking::Verbatim,
            fetch_icons: false,
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    ProbeIndex { domain: Domain },
    EnsureIndex { domain: Domain },
    Search { domain: Domain, seq: u64, query: String },
    FetchIcon { path: String },
    Ask { seq: u64, query: String },
    Open { path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    IndexProbed {
        domain: Domain,
        outcome: Result<bool, BackendError>,
    },
    IndexReady {
        domain: Domain,
        outcome: Result<(), BackendError>,
    },
    Search {
        domain: Domain,
        seq: u64,
        query: String,
        outcome: Result<Vec<RawResult>, BackendError>,
    },
    Icon {
        path: String,
        outcome: Result<IconRef, BackendError>,
    },
    Ask {
        seq: u64,
        query: String,
        outcome: Result<String, BackendError>,
    },
    Opened {
        path: String,
        outcome: Result<(), BackendError>,
    },
}

/// Latest-issued sequence number per domain.
///
/// A completion is honoured only while its number is still the latest for
/// its domain; anything older is stale and dropped.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    latest: BTreeMap<Domain, u64>,
}

impl SequenceTracker {
    pub fn issue(&mut self, domain: Domain) -> u64 {
        let counter = self.latest.entry(domain).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Supersedes whatever is in flight for `domain` without issuing a call.
    pub fn invalidate(&mut self, domain: Domain) {
        self.issue(domain);
    }

    pub fn latest(&self, domain: Domain) -> u64 {
        self.latest.get(&domain).copied().unwrap_or(0)
    }

    pub fn is_latest(&self, domain: Domain, seq: u64) -> bool {
        seq != 0 && self.latest(domain) == seq
    }
}

/// Executes requests against the backend with a bounded timeout, folding
/// every outcome into a [`BackendReply`]. Nothing escapes as a panic or an
/// unhandled error.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn LauncherBackend>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn LauncherBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn execute(&self, request: BackendRequest) -> BackendReply {
        debug!(?request, "dispatching backend call");
        match request {
            BackendRequest::ProbeIndex { domain } => BackendReply::IndexProbed {
                domain,
                outcome: self.bounded(self.backend.index_exists(domain)).await,
            },
            BackendRequest::EnsureIndex { domain } => BackendReply::IndexReady {
                domain,
                outcome: self.bounded(self.backend.ensure_index(domain)).await,
            },
            BackendRequest::Search { domain, seq, query } => {
                let outcome = self.bounded(self.backend.search(domain, &query)).await;
                BackendReply::Search {
                    domain,
                    seq,
                    query,
                    outcome,
                }
            }
            BackendRequest::FetchIcon { path } => {
                let outcome = self.bounded(self.backend.fetch_icon(&path)).await;
                BackendReply::Icon { path, outcome }
            }
            BackendRequest::Ask { seq, query } => {
                let outcome = self.bounded(self.backend.ask(&query)).await;
                BackendReply::Ask {
                    seq,
                    query,
                    outcome,
                }
            }
            BackendRequest::Open { path } => {
                let outcome = self.bounded(self.backend.open(&path)).await;
                BackendReply::Opened { path, outcome }
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout = ?self.timeout, "backend call timed out");
                Err(BackendError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{route, Capability, Ranking, SequenceTracker};
    use crate::model::Domain;

    #[test]
    fn sequence_numbers_are_per_domain_and_monotonic() {
        let mut tracker = SequenceTracker::default();
        let a = tracker.issue(Domain::Files);
        let b = tracker.issue(Domain::Files);
        let app = tracker.issue(Domain::Applications);

        assert!(b > a);
        assert!(!tracker.is_latest(Domain::Files, a));
        assert!(tracker.is_latest(Domain::Files, b));
        assert!(tracker.is_latest(Domain::Applications, app));
    }

    #[test]
    fn invalidate_supersedes_in_flight_call() {
        let mut tracker = SequenceTracker::default();
        let seq = tracker.issue(Domain::Assistant);
        tracker.invalidate(Domain::Assistant);
        assert!(!tracker.is_latest(Domain::Assistant, seq));
    }

    #[test]
    fn zero_is_never_latest() {
        let tracker = SequenceTracker::default();
        assert!(!tracker.is_latest(Domain::Files, 0));
    }

    #[test]
    fn routes_are_keyed_by_domain() {
        assert_eq!(route(Domain::Assistant).capability, Capability::Ask);
        assert!(!route(Domain::Assistant).needs_index);
        assert_eq!(route(Domain::Files).ranking, Ranking::ApplicationsFirst);
        assert_eq!(route(Domain::Applications).ranking, Ranking::Verbatim);
        assert!(route(Domain::Applications).needs_index);
    }
}

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::model::{Domain, IndexStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Index usable now.
    Ready,
    /// A creation attempt is already in flight; wait for it.
    Attached,
    /// The caller must issue exactly one creation call for this domain.
    Start,
}

/// Per-domain readiness with single-flight creation.
///
/// Status only changes through [`IndexTracker::ensure_ready`] and
/// [`IndexTracker::complete`], each of which checks and sets in one call.
#[derive(Debug, Clone)]
pub struct IndexTracker {
    statuses: BTreeMap<Domain, IndexStatus>,
}

impl Default for IndexTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexTracker {
    pub fn new() -> Self {
        let statuses = Domain::INDEXED
            .iter()
            .map(|domain| (*domain, IndexStatus::NotCreated))
            .collect();
        Self { statuses }
    }

    pub fn status(&self, domain: Domain) -> Option<IndexStatus> {
        self.statuses.get(&domain).copied()
    }

    pub fn statuses(&self) -> impl Iterator<Item = (Domain, IndexStatus)> + '_ {
        self.statuses.iter().map(|(domain, status)| (*domain, *status))
    }

    pub fn ensure_ready(&mut self, domain: Domain) -> Readiness {
        let Some(status) = self.statuses.get_mut(&domain) else {
            return Readiness::Ready;
        };

        match *status {
            IndexStatus::Ready => Readiness::Ready,
            IndexStatus::Creating => {
                debug!(%domain, "attaching to in-flight index creation");
                Readiness::Attached
            }
            IndexStatus::NotCreated | IndexStatus::Error => {
                info!(%domain, previous = ?*status, "starting index creation");
                *status = IndexStatus::Creating;
                Readiness::Start
            }
        }
    }

    /// Records a probe that found an existing index. Only a domain that has
    /// never been touched moves to `Ready`; an attempt in flight wins.
    pub fn mark_present(&mut self, domain: Domain) -> bool {
        match self.statuses.get_mut(&domain) {
            Some(status) if *status == IndexStatus::NotCreated => {
                debug!(%domain, "existing index found");
                *status = IndexStatus::Ready;
                true
            }
            _ => false,
        }
    }

    /// Resolves the in-flight attempt. Completions that arrive when no
    /// attempt is in flight are ignored and return `None`.
    pub fn complete(
        &mut self,
        domain: Domain,
        outcome: Result<(), &BackendError>,
    ) -> Option<IndexStatus> {
        let status = self.statuses.get_mut(&domain)?;
        if *status != IndexStatus::Creating {
            warn!(%domain, current = ?*status, "ignoring index completion with no attempt in flight");
            return None;
        }

        *status = match outcome {
            Ok(()) => {
                info!(%domain, "index ready");
                IndexStatus::Ready
            }
            Err(error) => {
                warn!(%domain, %error, "index creation failed");
                IndexStatus::Error
            }
        };
        Some(*status)
    }
}

#[cfg(test)]
mod tests {
    use super::{IndexTracker, Readiness};
    use crate::backend::BackendError;
    use crate::model::{Domain, IndexStatus};

    #[test]
    fn starts_with_one_not_created_entry_per_indexed_domain() {
        let tracker = IndexTracker::new();
        let statuses: Vec<_> = tracker.statuses().collect();
        assert_eq!(
            statuses,
            vec![
                (Domain::Applications, IndexStatus::NotCreated),
                (Domain::Files, IndexStatus::NotCreated),
            ]
        );
        assert_eq!(tracker.status(Domain::Assistant), None);
    }

    #[test]
    fn overlapping_calls_start_a_single_creation() {
        let mut tracker = IndexTracker::new();
        assert_eq!(tracker.ensure_ready(Domain::Files), Readiness::Start);
        assert_eq!(tracker.ensure_ready(Domain::Files), Readiness::Attached);
        assert_eq!(tracker.ensure_ready(Domain::Files), Readiness::Attached);
        assert_eq!(tracker.status(Domain::Files), Some(IndexStatus::Creating));
        assert_eq!(
            tracker.status(Domain::Applications),
            Some(IndexStatus::NotCreated)
        );
    }

    #[test]
    fn error_state_retries_on_demand() {
        let mut tracker = IndexTracker::new();
        tracker.ensure_ready(Domain::Applications);
        let error = BackendError::failed("disk full");
        assert_eq!(
            tracker.complete(Domain::Applications, Err(&error)),
            Some(IndexStatus::Error)
        );

        assert_eq!(tracker.ensure_ready(Domain::Applications), Readiness::Start);
        assert_eq!(
            tracker.complete(Domain::Applications, Ok(())),
            Some(IndexStatus::Ready)
        );
        assert_eq!(tracker.ensure_ready(Domain::Applications), Readiness::Ready);
    }

    #[test]
    fn completion_without_attempt_is_ignored() {
        let mut tracker = IndexTracker::new();
        assert_eq!(tracker.complete(Domain::Files, Ok(())), None);
        assert_eq!(tracker.status(Domain::Files), Some(IndexStatus::NotCreated));
    }

    #[test]
    fn probe_marks_only_untouched_domains_present() {
        let mut tracker = IndexTracker::new();
        assert!(tracker.mark_present(Domain::Applications));
        assert_eq!(tracker.status(Domain::Applications), Some(IndexStatus::Ready));

        tracker.ensure_ready(Domain::Files);
        assert!(!tracker.mark_present(Domain::Files));
        assert_eq!(tracker.status(Domain::Files), Some(IndexStatus::Creating));
        assert!(!tracker.mark_present(Domain::Assistant));
    }

    #[test]
    fn assistant_is_always_ready() {
        let mut tracker = IndexTracker::new();
        assert_eq!(tracker.ensure_ready(Domain::Assistant), Readiness::Ready);
    }
}

use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Blank input: nothing scheduled, the caller clears synchronously.
    Clear,
    /// Start a timer for `ticket`; any earlier ticket is void.
    Schedule { ticket: u64, delay: Duration },
}

#[derive(Debug, Clone)]
struct PendingInput {
    ticket: u64,
    text: String,
}

/// Collapses keystrokes into one dispatch per quiet window.
///
/// Only the bookkeeping lives here. The runtime owns the actual timer and
/// reports expiry with [`Debouncer::on_elapsed`]; a ticket that is no longer
/// the pending one is ignored, so a timer that fired just before being
/// cancelled cannot leak a dispatch.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    next_ticket: u64,
    pending: Option<PendingInput>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn on_input(&mut self, text: &str) -> DebounceDecision {
        if text.trim().is_empty() {
            self.pending = None;
            return DebounceDecision::Clear;
        }

        self.next_ticket += 1;
        self.pending = Some(PendingInput {
            ticket: self.next_ticket,
            text: text.to_string(),
        });
        DebounceDecision::Schedule {
            ticket: self.next_ticket,
            delay: self.delay,
        }
    }

    /// Returns the text to dispatch if `ticket` is still the pending one.
    pub fn on_elapsed(&mut self, ticket: u64) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take().map(|p| p.text),
            _ => None,
        }
    }

    /// Drops the pending input. Returns whether a timer was outstanding.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{DebounceDecision, Debouncer};
    use std::time::Duration;

    #[test]
    fn rapid_keystrokes_collapse_into_last_text() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let mut tickets = Vec::new();
        for text in ["d", "do", "doc"] {
            match debouncer.on_input(text) {
                DebounceDecision::Schedule { ticket, .. } => tickets.push(ticket),
                DebounceDecision::Clear => panic!("non-blank input must schedule"),
            }
        }

        assert_eq!(debouncer.on_elapsed(tickets[0]), None);
        assert_eq!(debouncer.on_elapsed(tickets[1]), None);
        assert_eq!(debouncer.on_elapsed(tickets[2]), Some("doc".to_string()));
        assert_eq!(debouncer.on_elapsed(tickets[2]), None);
    }

    #[test]
    fn whitespace_input_clears_without_scheduling() {
        let mut debouncer = Debouncer::default();
        let first = debouncer.on_input("report");
        assert!(matches!(first, DebounceDecision::Schedule { .. }));

        assert_eq!(debouncer.on_input("   "), DebounceDecision::Clear);
        assert!(!debouncer.is_pending());
        if let DebounceDecision::Schedule { ticket, .. } = first {
            assert_eq!(debouncer.on_elapsed(ticket), None);
        }
    }

    #[test]
    fn cancel_voids_outstanding_ticket() {
        let mut debouncer = Debouncer::default();
        let DebounceDecision::Schedule { ticket, delay } = debouncer.on_input("x") else {
            panic!("expected schedule");
        };
        assert_eq!(delay, Duration::from_millis(300));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.on_elapsed(ticket), None);
    }
}

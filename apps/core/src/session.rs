use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::config::Config;
use crate::contract::{AssistantView, ResultRow, SessionSnapshot, StatusBadge};
use crate::debounce::{DebounceDecision, Debouncer};
use crate::dispatcher::{route, BackendReply, BackendRequest, Capability, SequenceTracker};
use crate::index_tracker::{IndexTracker, Readiness};
use crate::model::{ConversationTurn, Domain, IconRef, IndexStatus, NavKey, RawResult, ResultSet};
use crate::normalize::build_result_set;
use crate::selection::{Direction, Selection};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Input(String),
    DebounceElapsed(u64),
    SwitchMode(Domain),
    Key(NavKey),
    /// Existence probe for an indexed domain, issued once at startup.
    Probe(Domain),
    Reply(BackendReply),
}

impl From<BackendReply> for SessionEvent {
    fn from(value: BackendReply) -> Self {
        Self::Reply(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace any running debounce timer with one for `ticket`.
    ScheduleDebounce { ticket: u64, delay: Duration },
    CancelDebounce,
    Dispatch(BackendRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParkedQuery {
    seq: u64,
    query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingOpen {
    path: String,
    domain: Domain,
    result_seq: u64,
}

#[derive(Debug, Clone, Default)]
struct AssistantState {
    response: Option<String>,
    pending: bool,
    history: Vec<ConversationTurn>,
}

/// The search session state machine.
///
/// Every input (keystroke, timer expiry, key press, backend completion) is a
/// [`SessionEvent`]; handling one never awaits and returns the [`Effect`]s the
/// runtime must carry out. All check-then-set transitions therefore happen
/// within a single scheduler turn.
#[derive(Debug)]
pub struct SessionController {
    mode: Domain,
    query: String,
    results: ResultSet,
    selection: Selection,
    debouncer: Debouncer,
    indexes: IndexTracker,
    sequences: SequenceTracker,
    in_flight: BTreeMap<Domain, u64>,
    parked: BTreeMap<Domain, ParkedQuery>,
    pending_open: Option<PendingOpen>,
    assistant: AssistantState,
    icons: HashMap<String, IconRef>,
    notice: Option<String>,
    history_window: usize,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(Domain::Applications, Debouncer::default(), 5)
    }
}

impl SessionController {
    pub fn new(mode: Domain, debouncer: Debouncer, history_window: usize) -> Self {
        Self {
            mode,
            query: String::new(),
            results: ResultSet::empty(mode),
            selection: Selection::default(),
            debouncer,
            indexes: IndexTracker::new(),
            sequences: SequenceTracker::default(),
            in_flight: BTreeMap::new(),
            parked: BTreeMap::new(),
            pending_open: None,
            assistant: AssistantState::default(),
            icons: HashMap::new(),
            notice: None,
            history_window: history_window.max(1),
        }
    }

    pub fn from_config(config: &Config, mode: Domain) -> Self {
        Self::new(
            mode,
            Debouncer::new(Duration::from_millis(config.debounce_ms)),
            config.history_window,
        )
    }

    pub fn mode(&self) -> Domain {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    pub fn index_status(&self, domain: Domain) -> Option<IndexStatus> {
        self.indexes.status(domain)
    }

    pub fn assistant_response(&self) -> Option<&str> {
        self.assistant.response.as_deref()
    }

    pub fn assistant_pending(&self) -> bool {
        self.assistant.pending
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.assistant.history
    }

    pub fn recent_history(&self) -> &[ConversationTurn] {
        let history = &self.assistant.history;
        &history[history.len().saturating_sub(self.history_window)..]
    }

    pub fn icon_for(&self, path: &str) -> Option<&IconRef> {
        self.icons.get(path)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_loading(&self, domain: Domain) -> bool {
        self.in_flight
            .get(&domain)
            .is_some_and(|seq| self.sequences.is_latest(domain, *seq))
    }

    pub fn debounce_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Input(text) => self.on_input(text),
            SessionEvent::DebounceElapsed(ticket) => match self.debouncer.on_elapsed(ticket) {
                Some(text) => self.submit(text),
                None => {
                    debug!(ticket, "ignoring superseded debounce ticket");
                    Vec::new()
                }
            },
            SessionEvent::SwitchMode(domain) => self.switch_mode(domain),
            SessionEvent::Key(key) => self.on_key(key),
            SessionEvent::Probe(domain) => self.probe(domain),
            SessionEvent::Reply(reply) => self.on_reply(reply),
        }
    }

    fn on_input(&mut self, text: String) -> Vec<Effect> {
        let capability = route(self.mode).capability;
        self.query = text;

        if self.query.trim().is_empty() {
            self.debouncer.on_input(&self.query);
            self.clear_session_view();
            return vec![Effect::CancelDebounce];
        }

        if capability == Capability::Ask {
            // Questions go out on Enter only.
            return if self.debouncer.cancel() {
                vec![Effect::CancelDebounce]
            } else {
                Vec::new()
            };
        }

        match self.debouncer.on_input(&self.query) {
            DebounceDecision::Schedule { ticket, delay } => {
                vec![Effect::ScheduleDebounce { ticket, delay }]
            }
            DebounceDecision::Clear => vec![Effect::CancelDebounce],
        }
    }

    fn submit(&mut self, query: String) -> Vec<Effect> {
        let domain = self.mode;
        let route = route(domain);
        self.notice = None;

        if route.capability == Capability::Ask {
            let seq = self.sequences.issue(domain);
            self.in_flight.insert(domain, seq);
            self.assistant.pending = true;
            self.assistant.response = None;
            info!(seq, "asking assistant");
            return vec![Effect::Dispatch(BackendRequest::Ask { seq, query })];
        }

        if !route.needs_index {
            return vec![self.issue_search(domain, query)];
        }

        match self.indexes.ensure_ready(domain) {
            Readiness::Ready => vec![self.issue_search(domain, query)],
            Readiness::Attached => {
                self.park(domain, query);
                Vec::new()
            }
            Readiness::Start => {
                self.park(domain, query);
                vec![Effect::Dispatch(BackendRequest::EnsureIndex { domain })]
            }
        }
    }

    fn issue_search(&mut self, domain: Domain, query: String) -> Effect {
        let seq = self.sequences.issue(domain);
        self.in_flight.insert(domain, seq);
        debug!(%domain, seq, query = %query, "issuing search");
        Effect::Dispatch(BackendRequest::Search { domain, seq, query })
    }

    fn park(&mut self, domain: Domain, query: String) {
        let seq = self.sequences.issue(domain);
        self.in_flight.insert(domain, seq);
        debug!(%domain, seq, "parking query until index is ready");
        self.parked.insert(domain, ParkedQuery { seq, query });
    }

    /// Asks whether an index already exists. Creation stays with the first
    /// search.
    fn probe(&mut self, domain: Domain) -> Vec<Effect> {
        match self.indexes.status(domain) {
            Some(IndexStatus::NotCreated) => {
                vec![Effect::Dispatch(BackendRequest::ProbeIndex { domain })]
            }
            Some(IndexStatus::Creating) => {
                debug!(%domain, "index creation already in flight, skipping probe");
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn switch_mode(&mut self, domain: Domain) -> Vec<Effect> {
        if domain == self.mode {
            return Vec::new();
        }

        info!(from = %self.mode, to = %domain, "switching mode");
        let had_timer = self.debouncer.cancel();
        self.abandon_requests(self.mode);
        self.mode = domain;
        self.query.clear();
        self.results = ResultSet::empty(domain);
        self.selection.reset();
        self.assistant.response = None;
        self.assistant.pending = false;
        self.pending_open = None;
        self.notice = None;

        if had_timer {
            vec![Effect::CancelDebounce]
        } else {
            Vec::new()
        }
    }

    fn on_key(&mut self, key: NavKey) -> Vec<Effect> {
        let assistant_mode = route(self.mode).capability == Capability::Ask;
        match key {
            NavKey::Up | NavKey::Down => {
                if assistant_mode || self.results.is_empty() {
                    return Vec::new();
                }
                let direction = if key == NavKey::Up {
                    Direction::Up
                } else {
                    Direction::Down
                };
                self.selection.navigate(direction, self.results.len());
                Vec::new()
            }
            NavKey::Enter if assistant_mode => {
                if self.query.trim().is_empty() {
                    return Vec::new();
                }
                self.debouncer.cancel();
                let mut effects = vec![Effect::CancelDebounce];
                effects.extend(self.submit(self.query.clone()));
                effects
            }
            NavKey::Enter => {
                let Some(item) = self.results.get(self.selection.index()) else {
                    return Vec::new();
                };
                let path = item.path.clone();
                info!(path = %path, "opening selected item");
                self.pending_open = Some(PendingOpen {
                    path: path.clone(),
                    domain: self.results.domain,
                    result_seq: self.results.seq,
                });
                vec![Effect::Dispatch(BackendRequest::Open { path })]
            }
            NavKey::Escape => {
                self.debouncer.cancel();
                self.query.clear();
                self.clear_session_view();
                vec![Effect::CancelDebounce]
            }
        }
    }

    fn on_reply(&mut self, reply: BackendReply) -> Vec<Effect> {
        match reply {
            BackendReply::IndexProbed { domain, outcome } => {
                match outcome {
                    Ok(true) => {
                        self.indexes.mark_present(domain);
                    }
                    Ok(false) => debug!(%domain, "no index yet, deferring creation to first search"),
                    Err(error) => warn!(%domain, %error, "index probe failed"),
                }
                Vec::new()
            }
            BackendReply::IndexReady { domain, outcome } => self.on_index_ready(domain, outcome),
            BackendReply::Search {
                domain,
                seq,
                query,
                outcome,
            } => self.on_search(domain, seq, query, outcome),
            BackendReply::Icon { path, outcome } => {
                match outcome {
                    Ok(icon) => {
                        self.icons.insert(path, icon);
                    }
                    Err(error) => debug!(path = %path, %error, "icon unavailable, using generic indicator"),
                }
                Vec::new()
            }
            BackendReply::Ask {
                seq,
                query,
                outcome,
            } => {
                self.on_answer(seq, query, outcome);
                Vec::new()
            }
            BackendReply::Opened { path, outcome } => self.on_opened(path, outcome),
        }
    }

    fn on_index_ready(&mut self, domain: Domain, outcome: Result<(), BackendError>) -> Vec<Effect> {
        let Some(status) = self.indexes.complete(domain, outcome.as_ref().map(|_| ())) else {
            return Vec::new();
        };

        let parked = self.parked.remove(&domain);
        match status {
            IndexStatus::Ready => match parked {
                Some(parked) if self.sequences.is_latest(domain, parked.seq) => {
                    debug!(%domain, seq = parked.seq, "resuming parked query");
                    vec![Effect::Dispatch(BackendRequest::Search {
                        domain,
                        seq: parked.seq,
                        query: parked.query,
                    })]
                }
                _ => Vec::new(),
            },
            _ => {
                self.in_flight.remove(&domain);
                if domain == self.mode && parked.is_some() {
                    self.results = ResultSet::empty(domain);
                    self.selection.clear_results();
                    if let Err(error) = outcome {
                        self.notice = Some(format!("Could not create {domain} index: {error}"));
                    }
                }
                Vec::new()
            }
        }
    }

    fn on_search(
        &mut self,
        domain: Domain,
        seq: u64,
        query: String,
        outcome: Result<Vec<RawResult>, BackendError>,
    ) -> Vec<Effect> {
        if domain != self.mode || !self.sequences.is_latest(domain, seq) {
            debug!(%domain, seq, latest = self.sequences.latest(domain), "discarding stale search result");
            return Vec::new();
        }
        self.in_flight.remove(&domain);

        match outcome {
            Ok(raw) => {
                let results = build_result_set(domain, seq, &query, raw);
                let selected = self.selection.on_replaced(&query, results.len());
                debug!(%domain, seq, count = results.len(), selected, "result set replaced");
                self.notice = results
                    .is_empty()
                    .then(|| format!("No results found for \"{query}\""));
                self.results = results;
                self.icon_requests(domain)
            }
            Err(error) => {
                warn!(%domain, seq, %error, "search failed");
                self.results = ResultSet::empty(domain);
                self.selection.clear_results();
                self.notice = Some(format!("Search error: {error}"));
                Vec::new()
            }
        }
    }

    fn icon_requests(&self, domain: Domain) -> Vec<Effect> {
        if !route(domain).fetch_icons {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        self.results
            .items()
            .iter()
            .filter(|item| item.is_application && item.icon.is_none())
            .filter(|item| !self.icons.contains_key(&item.path))
            .filter(|item| seen.insert(item.path.clone()))
            .map(|item| {
                Effect::Dispatch(BackendRequest::FetchIcon {
                    path: item.path.clone(),
                })
            })
            .collect()
    }

    fn on_answer(&mut self, seq: u64, query: String, outcome: Result<String, BackendError>) {
        let domain = Domain::Assistant;
        if self.mode != domain || !self.sequences.is_latest(domain, seq) {
            debug!(seq, "discarding stale assistant response");
            return;
        }
        self.in_flight.remove(&domain);
        self.assistant.pending = false;

        match outcome {
            Ok(response) => {
                self.assistant.response = Some(response.clone());
                self.assistant.history.push(ConversationTurn { query, response });
            }
            Err(error) => {
                warn!(seq, %error, "assistant request failed");
                self.assistant.response = Some(format!("Error: {error}"));
            }
        }
    }

    fn on_opened(&mut self, path: String, outcome: Result<(), BackendError>) -> Vec<Effect> {
        let pending = self.pending_open.take_if(|pending| pending.path == path);
        if let Err(error) = outcome {
            warn!(path = %path, %error, "failed to open item");
            return Vec::new();
        }

        let Some(pending) = pending else {
            return Vec::new();
        };
        let same_results =
            self.results.domain == pending.domain && self.results.seq == pending.result_seq;
        if !same_results || self.results.is_empty() {
            return Vec::new();
        }

        // Anything typed after Enter belongs to the query being cleared.
        self.debouncer.cancel();
        self.abandon_requests(self.mode);
        self.query.clear();
        self.results = ResultSet::empty(self.mode);
        self.selection.reset();
        self.notice = None;
        vec![Effect::CancelDebounce]
    }

    fn clear_session_view(&mut self) {
        for domain in [self.mode, Domain::Assistant] {
            self.abandon_requests(domain);
        }
        self.results = ResultSet::empty(self.mode);
        self.selection.reset();
        self.assistant.response = None;
        self.assistant.pending = false;
        self.pending_open = None;
        self.notice = None;
    }

    /// Supersedes anything in flight or parked for `domain`. Index creation
    /// itself keeps running and still updates the status map.
    fn abandon_requests(&mut self, domain: Domain) {
        let had_call = self.in_flight.remove(&domain).is_some();
        let had_parked = self.parked.remove(&domain).is_some();
        if had_call || had_parked {
            self.sequences.invalidate(domain);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let results = self
            .results
            .items()
            .iter()
            .map(|item| ResultRow {
                name: item.name.clone(),
                display_name: item.display_name().to_string(),
                path: item.path.clone(),
                is_application: item.is_application,
                icon: item.icon.clone().or_else(|| self.icon_for(&item.path).cloned()),
                glyph: item.glyph().to_string(),
            })
            .collect();

        let statuses = self
            .indexes
            .statuses()
            .map(|(domain, status)| StatusBadge {
                domain,
                status,
                label: status.badge().to_string(),
            })
            .collect();

        let assistant = (self.mode == Domain::Assistant).then(|| AssistantView {
            response: self.assistant.response.clone(),
            pending: self.assistant.pending,
            recent: self.recent_history().to_vec(),
        });

        SessionSnapshot {
            mode: self.mode,
            query: self.query.clone(),
            results,
            selected_index: self.selection.index(),
            loading: self.is_loading(self.mode),
            statuses,
            assistant,
            hint: self.hint(),
        }
    }

    fn hint(&self) -> Option<String> {
        if let Some(notice) = &self.notice {
            return Some(notice.clone());
        }
        if self.query.trim().is_empty() {
            return None;
        }

        let noun = match self.mode {
            Domain::Applications => "App",
            Domain::Files => "File",
            Domain::Assistant => return None,
        };
        match self.indexes.status(self.mode) {
            Some(IndexStatus::Creating) => Some(format!("Creating {} index...", noun.to_lowercase())),
            Some(IndexStatus::NotCreated) => Some(format!(
                "{noun} index will be created automatically on first search"
            )),
            _ => None,
        }
    }
}

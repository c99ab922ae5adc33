use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error};

use crate::backend::LauncherBackend;
use crate::config::{Config, ConfigError};
use crate::contract::SessionSnapshot;
use crate::dispatcher::{BackendReply, Dispatcher};
use crate::index_store::StoreError;
use crate::model::{Domain, NavKey};
use crate::session::{Effect, SessionController, SessionEvent};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("index store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drives a [`SessionController`] on tokio: arms the debounce timer, runs
/// backend calls as tasks and feeds every completion back in as an event.
pub struct SessionRuntime {
    controller: SessionController,
    dispatcher: Dispatcher,
    calls: JoinSet<BackendReply>,
    timer: Option<JoinHandle<()>>,
    ticket_tx: mpsc::UnboundedSender<u64>,
    ticket_rx: mpsc::UnboundedReceiver<u64>,
}

impl SessionRuntime {
    pub fn new(controller: SessionController, dispatcher: Dispatcher) -> Self {
        let (ticket_tx, ticket_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            dispatcher,
            calls: JoinSet::new(),
            timer: None,
            ticket_tx,
            ticket_rx,
        }
    }

    pub fn from_config(config: &Config, backend: Arc<dyn LauncherBackend>, mode: Domain) -> Self {
        let dispatcher = Dispatcher::new(backend, Duration::from_millis(config.backend_timeout_ms));
        Self::new(SessionController::from_config(config, mode), dispatcher)
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    /// Probes every indexed domain once so status badges reflect indexes
    /// that already exist. Missing indexes are left for the first search.
    pub fn start(&mut self) {
        for domain in Domain::INDEXED {
            self.submit(SessionEvent::Probe(domain));
        }
    }

    pub fn input(&mut self, text: impl Into<String>) {
        self.submit(SessionEvent::Input(text.into()));
    }

    pub fn key(&mut self, key: NavKey) {
        self.submit(SessionEvent::Key(key));
    }

    pub fn switch_mode(&mut self, domain: Domain) {
        self.submit(SessionEvent::SwitchMode(domain));
    }

    pub fn submit(&mut self, event: SessionEvent) {
        let effects = self.controller.handle(event);
        for effect in effects {
            self.apply(effect);
        }
    }

    /// True while a debounce window is open or any backend call is running.
    pub fn has_pending_work(&self) -> bool {
        self.controller.debounce_pending() || !self.calls.is_empty()
    }

    /// Waits for the next timer or call completion and applies it.
    /// Returns `false` when nothing is outstanding.
    pub async fn step(&mut self) -> bool {
        if !self.has_pending_work() {
            return false;
        }

        let debounce_armed = self.controller.debounce_pending();
        tokio::select! {
            Some(ticket) = self.ticket_rx.recv(), if debounce_armed => {
                self.submit(SessionEvent::DebounceElapsed(ticket));
            }
            Some(joined) = self.calls.join_next(), if !self.calls.is_empty() => match joined {
                Ok(reply) => self.submit(SessionEvent::Reply(reply)),
                Err(join_error) => error!(%join_error, "backend task did not complete"),
            },
            else => return false,
        }
        true
    }

    /// Runs until the debounce window has closed and every call has completed.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleDebounce { ticket, delay } => {
                self.abort_timer();
                let tx = self.ticket_tx.clone();
                self.timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(ticket);
                }));
                debug!(ticket, ?delay, "debounce armed");
            }
            Effect::CancelDebounce => {
                self.abort_timer();
                debug!("debounce cancelled");
            }
            Effect::Dispatch(request) => {
                let dispatcher = self.dispatcher.clone();
                self.calls
                    .spawn(async move { dispatcher.execute(request).await });
            }
        }
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::SessionRuntime;
    use crate::backend::{BackendError, LauncherBackend};
    use crate::config::Config;
    use crate::model::{Domain, IconRef, IndexStatus, RawResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyBackend;

    #[async_trait]
    impl LauncherBackend for EmptyBackend {
        async fn index_exists(&self, _domain: Domain) -> Result<bool, BackendError> {
            Ok(true)
        }

        async fn ensure_index(&self, _domain: Domain) -> Result<(), BackendError> {
            Ok(())
        }

        async fn search(&self, _domain: Domain, _query: &str) -> Result<Vec<RawResult>, BackendError> {
            Ok(Vec::new())
        }

        async fn fetch_icon(&self, path: &str) -> Result<IconRef, BackendError> {
            Err(BackendError::NotFound(path.to_string()))
        }

        async fn ask(&self, _query: &str) -> Result<String, BackendError> {
            Ok(String::new())
        }

        async fn open(&self, _path: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_probes_every_indexed_domain() {
        let mut runtime =
            SessionRuntime::from_config(&Config::default(), Arc::new(EmptyBackend), Domain::Files);
        runtime.start();
        assert!(runtime.has_pending_work());
        assert_eq!(runtime.controller().index_status(Domain::Files), Some(IndexStatus::NotCreated));

        runtime.settle().await;

        assert!(!runtime.has_pending_work());
        for domain in Domain::INDEXED {
            assert_eq!(runtime.controller().index_status(domain), Some(IndexStatus::Ready));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn settle_returns_immediately_when_idle() {
        let mut runtime =
            SessionRuntime::from_config(&Config::default(), Arc::new(EmptyBackend), Domain::Files);
        assert!(!runtime.step().await);
        runtime.settle().await;
        assert_eq!(runtime.snapshot().query, "");
    }
}

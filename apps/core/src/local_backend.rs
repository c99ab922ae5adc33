use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::action_executor::{self, LaunchError};
use crate::backend::{BackendError, LauncherBackend};
use crate::config::Config;
use crate::discovery::provider_for;
use crate::icons::find_bundle_icon;
use crate::index_store::{self, StoreError};
use crate::model::{Domain, IconRef, RawResult};
use crate::search;

const ASK_PREAMBLE: &str = "Give a brief and concise answer\n";

/// Filesystem crawler + SQLite index + external assistant command.
pub struct LocalBackend {
    db: Arc<Mutex<Connection>>,
    app_roots: Vec<PathBuf>,
    file_roots: Vec<PathBuf>,
    max_results: usize,
    assistant_command: Option<Vec<String>>,
}

impl LocalBackend {
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        let db = index_store::open_file(&config.index_db_path)?;
        Ok(Self::with_connection(db, config))
    }

    pub fn with_connection(db: Connection, config: &Config) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            app_roots: config.app_roots.clone(),
            file_roots: config.file_roots.clone(),
            max_results: usize::from(config.max_results),
            assistant_command: config.assistant_command.clone(),
        }
    }

    async fn with_db<T, F>(&self, work: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, BackendError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|_| BackendError::failed("index store lock poisoned"))?;
            work(&mut guard)
        })
        .await
        .map_err(|error| BackendError::failed(format!("index task failed: {error}")))?
    }
}

fn store_error(error: StoreError) -> BackendError {
    BackendError::failed(error.to_string())
}

fn launch_error(error: LaunchError) -> BackendError {
    match error {
        LaunchError::EmptyPath | LaunchError::MissingPath(_) => {
            BackendError::NotFound(error.to_string())
        }
        LaunchError::Spawn { .. } => BackendError::failed(error.to_string()),
    }
}

#[async_trait]
impl LauncherBackend for LocalBackend {
    async fn index_exists(&self, domain: Domain) -> Result<bool, BackendError> {
        if !domain.is_indexed() {
            return Ok(true);
        }
        let count = self
            .with_db(move |db| index_store::count_domain(db, domain).map_err(store_error))
            .await?;
        Ok(count > 0)
    }

    async fn ensure_index(&self, domain: Domain) -> Result<(), BackendError> {
        let Some(provider) = provider_for(domain, &self.app_roots, &self.file_roots) else {
            return Ok(());
        };

        let existing = self
            .with_db(move |db| index_store::count_domain(db, domain).map_err(store_error))
            .await?;
        if existing > 0 {
            debug!(%domain, existing, "index already present");
            return Ok(());
        }

        let entries = tokio::task::spawn_blocking(move || provider.discover())
            .await
            .map_err(|error| BackendError::failed(format!("crawl task failed: {error}")))?
            .map_err(|error| BackendError::failed(error.to_string()))?;

        let stored = self
            .with_db(move |db| index_store::replace_domain(db, domain, &entries).map_err(store_error))
            .await?;
        info!(%domain, stored, "index created");
        Ok(())
    }

    async fn search(&self, domain: Domain, query: &str) -> Result<Vec<RawResult>, BackendError> {
        if !domain.is_indexed() {
            return Err(BackendError::Unavailable(format!("{domain} has no index")));
        }

        let query = query.to_string();
        let limit = self.max_results;
        self.with_db(move |db| {
            let entries = index_store::list_domain(db, domain).map_err(store_error)?;
            Ok(search::search(&entries, &query, limit))
        })
        .await
    }

    async fn fetch_icon(&self, path: &str) -> Result<IconRef, BackendError> {
        let bundle = PathBuf::from(path);
        let found = tokio::task::spawn_blocking(move || find_bundle_icon(&bundle))
            .await
            .map_err(|error| BackendError::failed(format!("icon task failed: {error}")))?;
        found
            .map(IconRef::File)
            .ok_or_else(|| BackendError::NotFound(format!("no icon for {path}")))
    }

    async fn ask(&self, query: &str) -> Result<String, BackendError> {
        let Some((program, args)) = self
            .assistant_command
            .as_ref()
            .and_then(|command| command.split_first())
        else {
            return Err(BackendError::Unavailable(
                "no assistant command configured".to_string(),
            ));
        };

        let output = Command::new(program)
            .args(args)
            .arg(format!("{ASK_PREAMBLE}{query}"))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| BackendError::Unavailable(format!("{program}: {error}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "assistant command failed");
            return Err(BackendError::Unavailable(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn open(&self, path: &str) -> Result<(), BackendError> {
        let target = path.to_string();
        tokio::task::spawn_blocking(move || action_executor::launch_path(&target))
            .await
            .map_err(|error| BackendError::failed(format!("open task failed: {error}")))?
            .map_err(launch_error)?;
        info!(path, "opened");
        Ok(())
    }
}

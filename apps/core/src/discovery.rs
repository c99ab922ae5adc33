use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::index_store::IndexEntry;
use crate::model::Domain;

const APPLICATION_EXTENSIONS: [&str; 3] = ["app", "exe", "desktop"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} discovery failed: {message}")]
pub struct ProviderError {
    provider: &'static str,
    message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

pub trait DiscoveryProvider: Send + Sync {
    fn domain(&self) -> Domain;
    fn discover(&self) -> Result<Vec<IndexEntry>, ProviderError>;
}

/// Application bundles and launchers sitting directly under each root.
pub struct AppProvider {
    roots: Vec<PathBuf>,
}

impl AppProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl DiscoveryProvider for AppProvider {
    fn domain(&self) -> Domain {
        Domain::Applications
    }

    fn discover(&self) -> Result<Vec<IndexEntry>, ProviderError> {
        let mut entries = Vec::new();
        for root in existing_roots(&self.roots) {
            let walker = WalkDir::new(root)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name();
            for entry in walker.into_iter().filter_map(Result::ok) {
                if is_application(entry.path()) {
                    entries.push(to_index_entry(&entry));
                }
            }
        }
        debug!(count = entries.len(), "discovered applications");
        Ok(entries)
    }
}

/// Every visible regular file below each root.
pub struct FileProvider {
    roots: Vec<PathBuf>,
}

impl FileProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl DiscoveryProvider for FileProvider {
    fn domain(&self) -> Domain {
        Domain::Files
    }

    fn discover(&self) -> Result<Vec<IndexEntry>, ProviderError> {
        let roots = existing_roots(&self.roots);
        if roots.is_empty() && !self.roots.is_empty() {
            return Err(ProviderError::new("file", "none of the file roots exist"));
        }

        let mut entries = Vec::new();
        for root in roots {
            let walker = WalkDir::new(root)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !is_hidden(entry));
            for entry in walker.filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    entries.push(to_index_entry(&entry));
                }
            }
        }
        debug!(count = entries.len(), "discovered files");
        Ok(entries)
    }
}

/// Provider for the given indexed domain over the matching config roots.
pub fn provider_for(
    domain: Domain,
    app_roots: &[PathBuf],
    file_roots: &[PathBuf],
) -> Option<Box<dyn DiscoveryProvider>> {
    match domain {
        Domain::Applications => Some(Box::new(AppProvider::new(app_roots.to_vec()))),
        Domain::Files => Some(Box::new(FileProvider::new(file_roots.to_vec()))),
        Domain::Assistant => None,
    }
}

fn existing_roots(roots: &[PathBuf]) -> Vec<&Path> {
    roots
        .iter()
        .map(PathBuf::as_path)
        .filter(|root| {
            let exists = root.is_dir();
            if !exists {
                debug!(root = %root.display(), "skipping missing root");
            }
            exists
        })
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_application(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            APPLICATION_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

fn to_index_entry(entry: &DirEntry) -> IndexEntry {
    IndexEntry::new(
        entry.file_name().to_string_lossy(),
        entry.path().to_string_lossy(),
    )
}

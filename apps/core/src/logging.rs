use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LOG_FILE_NAME: &str = "aleph.log";
const ARCHIVE_PREFIX: &str = "aleph-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;
pub const LOG_ENV_VAR: &str = "ALEPH_LOG";

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Routes `tracing` output to `<data dir>/logs/aleph.log`, rotating the
/// previous file first when it grew past the size limit. Returns the log path.
pub fn init(config: &Config) -> Result<PathBuf, std::io::Error> {
    init_in(&logs_dir(), &config.log_level)
}

pub fn init_in(log_dir: &Path, default_level: &str) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish();

    // A subscriber installed earlier (tests, embedding hosts) wins.
    let _ = tracing::subscriber::set_global_default(subscriber);

    install_panic_hook();
    Ok(log_path)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let stamp = now_secs();
    let archived = log_dir.join(format!("{ARCHIVE_PREFIX}{stamp}.log"));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)?;
    Ok(())
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.drain(..excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(%location, %payload, "panic");
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::{logs_dir, rotate_if_needed, MAX_ARCHIVES, MAX_LOG_BYTES};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn logs_dir_uses_stable_app_data_layout() {
        let dir = logs_dir();
        assert!(dir.to_string_lossy().to_ascii_lowercase().contains("aleph"));
    }

    #[test]
    fn oversized_log_is_archived_and_archives_are_pruned() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("aleph-log-rotate-{unique}"));
        std::fs::create_dir_all(&dir).expect("log dir should be created");
        for stamp in 0..MAX_ARCHIVES + 2 {
            std::fs::write(dir.join(format!("aleph-{stamp:04}.log")), b"old")
                .expect("archive should be written");
        }
        let log_path = dir.join("aleph.log");
        std::fs::write(&log_path, vec![b'x'; MAX_LOG_BYTES as usize])
            .expect("log should be written");

        rotate_if_needed(&log_path, &dir).expect("rotation should succeed");

        assert!(!log_path.exists());
        let archives = std::fs::read_dir(&dir)
            .expect("dir should be readable")
            .filter_map(|entry| entry.ok())
            .count();
        assert_eq!(archives, MAX_ARCHIVES);
        assert!(!dir.join("aleph-0000.log").exists());

        std::fs::remove_dir_all(&dir).expect("temp dir should be removed");
    }

    #[test]
    fn small_log_is_left_in_place() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("aleph-log-small-{unique}"));
        std::fs::create_dir_all(&dir).expect("log dir should be created");
        let log_path = dir.join("aleph.log");
        std::fs::write(&log_path, b"tiny").expect("log should be written");

        rotate_if_needed(&log_path, &dir).expect("rotation should succeed");
        assert!(log_path.exists());

        std::fs::remove_dir_all(&dir).expect("temp dir should be removed");
    }
}

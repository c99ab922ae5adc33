use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to encode toml: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid json5: {0}")]
    Json5(#[from] json5::Error),
    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debounce_ms: u64,
    pub backend_timeout_ms: u64,
    pub max_results: u16,
    pub history_window: usize,
    pub app_roots: Vec<PathBuf>,
    pub file_roots: Vec<PathBuf>,
    pub index_db_path: PathBuf,
    pub assistant_command: Option<Vec<String>>,
    pub log_level: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            debounce_ms: 300,
            backend_timeout_ms: 10_000,
            max_results: 15,
            history_window: 5,
            app_roots: default_app_roots(),
            file_roots: default_file_roots(),
            index_db_path: base.join("index.sqlite3"),
            assistant_command: None,
            log_level: "info".to_string(),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("aleph")
}

fn default_app_roots() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        let mut roots = vec![PathBuf::from("/Applications")];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Applications"));
        }
        roots
    } else if cfg!(target_os = "windows") {
        ["ProgramFiles", "ProgramFiles(x86)"]
            .iter()
            .filter_map(|var| std::env::var_os(var).map(PathBuf::from))
            .collect()
    } else {
        let mut roots = vec![PathBuf::from("/usr/share/applications")];
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("applications"));
        }
        roots
    }
}

fn default_file_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    [
        "Desktop",
        "Documents",
        "Downloads",
        "Pictures",
        "Music",
        "Movies",
        "Public",
    ]
    .iter()
    .map(|folder| home.join(folder))
    .collect()
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.debounce_ms > 5_000 {
        return Err(ConfigError::Invalid("debounce_ms out of range".into()));
    }

    if !(100..=300_000).contains(&cfg.backend_timeout_ms) {
        return Err(ConfigError::Invalid("backend_timeout_ms out of range".into()));
    }

    if cfg.max_results < 5 || cfg.max_results > 100 {
        return Err(ConfigError::Invalid("max_results out of range".into()));
    }

    if !(1..=50).contains(&cfg.history_window) {
        return Err(ConfigError::Invalid("history_window out of range".into()));
    }

    if cfg.index_db_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("index_db_path is required".into()));
    }

    if let Some(command) = &cfg.assistant_command {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid("assistant_command needs a program".into()));
        }
    }

    Ok(())
}

/// Loads the config at `path`, or the default location. A missing file
/// yields defaults pointed at that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| stable_app_data_dir().join(CONFIG_FILE_NAME));

    let mut config = if config_path.exists() {
        let raw = fs::read_to_string(&config_path)?;
        parse(&raw, &config_path)?
    } else {
        Config::default()
    };
    config.config_path = config_path;

    validate(&config)?;
    Ok(config)
}

pub fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    if is_json_path(path) {
        Ok(json5::from_str(raw)?)
    } else {
        Ok(toml::from_str(raw)?)
    }
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let encoded = if is_json_path(&cfg.config_path) {
        serde_json::to_string_pretty(cfg)?
    } else {
        toml::to_string_pretty(cfg)?
    };
    fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}

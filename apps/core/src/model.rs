use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APPLICATION_SUFFIXES: [&str; 4] = [".app", ".exe", ".dmg", ".pkg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Applications,
    Files,
    Assistant,
}

impl Domain {
    /// Domains backed by an index. The assistant never is.
    pub const INDEXED: [Domain; 2] = [Domain::Applications, Domain::Files];

    pub fn is_indexed(self) -> bool {
        !matches!(self, Domain::Assistant)
    }

    pub fn label(self) -> &'static str {
        match self {
            Domain::Applications => "Apps",
            Domain::Files => "Files",
            Domain::Assistant => "Assistant",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "apps" | "app" | "applications" => Some(Domain::Applications),
            "files" | "file" => Some(Domain::Files),
            "assistant" | "ask" | "ai" => Some(Domain::Assistant),
            _ => None,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    #[default]
    NotCreated,
    Creating,
    Ready,
    Error,
}

impl IndexStatus {
    pub fn badge(self) -> &'static str {
        match self {
            IndexStatus::NotCreated => "Not Created",
            IndexStatus::Creating => "Creating…",
            IndexStatus::Ready => "Ready",
            IndexStatus::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IconRef {
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub icon: Option<IconRef>,
}

impl RawResult {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            score: None,
            icon: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub path: String,
    pub is_application: bool,
    pub icon: Option<IconRef>,
}

impl SearchResult {
    pub fn display_name(&self) -> &str {
        if self.is_application && self.name.to_ascii_lowercase().ends_with(".app") {
            return &self.name[..self.name.len() - 4];
        }
        &self.name
    }

    /// Generic indicator used when no icon is available.
    pub fn glyph(&self) -> &'static str {
        if self.is_application {
            return "app";
        }

        let extension = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "txt" | "md" | "rtf" => "document",
            "pdf" => "pdf",
            "jpg" | "jpeg" | "png" | "gif" | "bmp" => "image",
            "mp4" | "mov" | "avi" | "mkv" => "video",
            "mp3" | "wav" | "flac" | "aac" => "audio",
            "zip" | "rar" | "7z" | "tar" => "archive",
            "js" | "ts" | "py" | "java" | "cpp" | "c" | "rs" => "code",
            _ => "folder",
        }
    }
}

pub fn has_application_suffix(name: &str) -> bool {
    let lower = name.to_lowercase();
    APPLICATION_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// An ordered answer to one dispatch. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub domain: Domain,
    pub seq: u64,
    pub query: String,
    items: Vec<SearchResult>,
}

impl ResultSet {
    pub fn new(domain: Domain, seq: u64, query: impl Into<String>, items: Vec<SearchResult>) -> Self {
        Self {
            domain,
            seq,
            query: query.into(),
            items,
        }
    }

    pub fn empty(domain: Domain) -> Self {
        Self::new(domain, 0, String::new(), Vec::new())
    }

    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

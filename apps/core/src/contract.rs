use serde::{Deserialize, Serialize};

use crate::model::{ConversationTurn, Domain, IconRef, IndexStatus, RawResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnsureIndexRequest {
    pub domain: Domain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub domain: Domain,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CommandRequest {
    EnsureIndex(EnsureIndexRequest),
    Search(SearchRequest),
    FetchIcon(PathRequest),
    Ask(AskRequest),
    Open(PathRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<RawResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IconResponse {
    pub icon: IconRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CommandResponse {
    EnsureIndex { ready: bool },
    Search(SearchResponse),
    FetchIcon(IconResponse),
    Ask(AskResponse),
    Open { opened: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub display_name: String,
    pub path: String,
    pub is_application: bool,
    pub icon: Option<IconRef>,
    pub glyph: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBadge {
    pub domain: Domain,
    pub status: IndexStatus,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantView {
    pub response: Option<String>,
    pub pending: bool,
    pub recent: Vec<ConversationTurn>,
}

/// Everything the view layer needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub mode: Domain,
    pub query: String,
    pub results: Vec<ResultRow>,
    pub selected_index: usize,
    pub loading: bool,
    pub statuses: Vec<StatusBadge>,
    pub assistant: Option<AssistantView>,
    pub hint: Option<String>,
}

impl SessionSnapshot {
    pub fn selected(&self) -> Option<&ResultRow> {
        self.results.get(self.selected_index)
    }
}

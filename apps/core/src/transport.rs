use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, LauncherBackend};
use crate::contract::{AskResponse, CommandRequest, CommandResponse, IconResponse, SearchResponse};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Unavailable,
    Timeout,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CommandResponse },
    Err { error: ErrorResponse },
}

pub async fn handle_request(
    backend: &dyn LauncherBackend,
    request: CommandRequest,
) -> TransportResponse {
    if let Some(error) = validate_request(&request) {
        return TransportResponse::Err { error };
    }

    let outcome = match request {
        CommandRequest::EnsureIndex(payload) => backend
            .ensure_index(payload.domain)
            .await
            .map(|()| CommandResponse::EnsureIndex { ready: true }),
        CommandRequest::Search(payload) => backend
            .search(payload.domain, &payload.query)
            .await
            .map(|results| CommandResponse::Search(SearchResponse { results })),
        CommandRequest::FetchIcon(payload) => backend
            .fetch_icon(&payload.path)
            .await
            .map(|icon| CommandResponse::FetchIcon(IconResponse { icon })),
        CommandRequest::Ask(payload) => backend
            .ask(&payload.query)
            .await
            .map(|text| CommandResponse::Ask(AskResponse { text })),
        CommandRequest::Open(payload) => backend
            .open(&payload.path)
            .await
            .map(|()| CommandResponse::Open { opened: true }),
    };

    match outcome {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_backend_error(error),
        },
    }
}

pub async fn handle_json(backend: &dyn LauncherBackend, payload: &str) -> String {
    let response = match serde_json::from_str::<CommandRequest>(payload) {
        Ok(request) => handle_request(backend, request).await,
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        format!(
            "{{\"status\":\"err\",\"error\":{{\"code\":\"failed\",\"message\":\"{}\"}}}}",
            error.to_string().replace('"', "'")
        )
    })
}

fn validate_request(request: &CommandRequest) -> Option<ErrorResponse> {
    let message = match request {
        CommandRequest::Search(payload) if payload.query.trim().is_empty() => "query is empty",
        CommandRequest::Ask(payload) if payload.query.trim().is_empty() => "query is empty",
        CommandRequest::FetchIcon(payload) | CommandRequest::Open(payload)
            if payload.path.trim().is_empty() =>
        {
            "path is empty"
        }
        _ => return None,
    };
    Some(ErrorResponse {
        code: ErrorCode::InvalidRequest,
        message: message.to_string(),
    })
}

fn map_backend_error(error: BackendError) -> ErrorResponse {
    let code = match &error {
        BackendError::Unavailable(_) => ErrorCode::Unavailable,
        BackendError::Timeout(_) => ErrorCode::Timeout,
        BackendError::NotFound(_) => ErrorCode::NotFound,
        BackendError::Failed(_) => ErrorCode::Failed,
    };
    ErrorResponse {
        code,
        message: error.to_string(),
    }
}

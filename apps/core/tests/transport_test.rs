use aleph_core::config::Config;
use aleph_core::contract::{CommandRequest, CommandResponse, PathRequest, SearchRequest};
use aleph_core::index_store::{self, IndexEntry};
use aleph_core::local_backend::LocalBackend;
use aleph_core::model::Domain;
use aleph_core::transport::{handle_json, handle_request, ErrorCode, TransportResponse};

fn backend_with_seed_entries() -> LocalBackend {
    let mut db = index_store::open_memory().unwrap();
    index_store::replace_domain(
        &mut db,
        Domain::Applications,
        &[
            IndexEntry::new("Code.app", "/Applications/Code.app"),
            IndexEntry::new("Calendar.app", "/Applications/Calendar.app"),
        ],
    )
    .unwrap();
    let config = Config {
        app_roots: Vec::new(),
        file_roots: Vec::new(),
        assistant_command: None,
        ..Config::default()
    };
    LocalBackend::with_connection(db, &config)
}

#[tokio::test]
async fn request_handler_returns_ok_transport_response() {
    let backend = backend_with_seed_entries();

    let response = handle_request(
        &backend,
        CommandRequest::Search(SearchRequest {
            domain: Domain::Applications,
            query: "code".into(),
        }),
    )
    .await;

    match response {
        TransportResponse::Ok {
            response: CommandResponse::Search(search),
        } => {
            assert_eq!(search.results[0].name, "Code.app");
            let encoded = serde_json::to_string(&TransportResponse::Ok {
                response: CommandResponse::Search(search),
            })
            .unwrap();
            assert!(encoded.contains("\"status\":\"ok\""));
        }
        other => panic!("expected ok search response, got {other:?}"),
    }
}

#[tokio::test]
async fn json_handler_returns_invalid_json_error_code() {
    let backend = backend_with_seed_entries();

    let raw = handle_json(&backend, "{not-json").await;
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidJson),
        _ => panic!("expected invalid json error"),
    }
}

#[tokio::test]
async fn blank_query_is_an_invalid_request() {
    let backend = backend_with_seed_entries();

    let raw = handle_json(
        &backend,
        r#"{"kind":"search","payload":{"domain":"files","query":"   "}}"#,
    )
    .await;
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidRequest),
        _ => panic!("expected invalid request error"),
    }
}

#[tokio::test]
async fn existing_index_reports_ready_without_crawling() {
    let backend = backend_with_seed_entries();

    let raw = handle_json(
        &backend,
        r#"{"kind":"ensure_index","payload":{"domain":"applications"}}"#,
    )
    .await;

    assert!(raw.contains("\"status\":\"ok\""), "unexpected response: {raw}");
    assert!(raw.contains("\"ready\":true"));
}

#[tokio::test]
async fn backend_errors_map_to_error_codes() {
    let backend = backend_with_seed_entries();

    let open = handle_request(
        &backend,
        CommandRequest::Open(PathRequest {
            path: "/definitely/not/a/real/path.txt".into(),
        }),
    )
    .await;
    match open {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::NotFound),
        other => panic!("expected not found, got {other:?}"),
    }

    let ask = handle_json(&backend, r#"{"kind":"ask","payload":{"query":"hi"}}"#).await;
    let parsed: TransportResponse = serde_json::from_str(&ask).unwrap();
    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::Unavailable),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

use aleph_core::contract::{
    AskRequest, CommandRequest, CommandResponse, EnsureIndexRequest, IconResponse, SearchRequest,
    SessionSnapshot,
};
use aleph_core::model::{Domain, IconRef, IndexStatus};
use aleph_core::session::SessionController;

#[test]
fn serializes_and_deserializes_search_request() {
    let request = CommandRequest::Search(SearchRequest {
        domain: Domain::Files,
        query: "report".to_string(),
    });

    let encoded = serde_json::to_string(&request).unwrap();
    let decoded: CommandRequest = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, request);
    assert_eq!(
        encoded,
        r#"{"kind":"search","payload":{"domain":"files","query":"report"}}"#
    );
}

#[test]
fn request_kinds_use_snake_case_tags() {
    let ensure = serde_json::to_string(&CommandRequest::EnsureIndex(EnsureIndexRequest {
        domain: Domain::Applications,
    }))
    .unwrap();
    assert!(ensure.contains("\"kind\":\"ensure_index\""));
    assert!(ensure.contains("\"domain\":\"applications\""));

    let ask = serde_json::to_string(&CommandRequest::Ask(AskRequest {
        query: "why".into(),
    }))
    .unwrap();
    assert!(ask.contains("\"kind\":\"ask\""));
}

#[test]
fn icon_response_carries_tagged_icon_reference() {
    let response = CommandResponse::FetchIcon(IconResponse {
        icon: IconRef::File("/Applications/Notes.app/Contents/Resources/AppIcon.icns".into()),
    });

    let encoded = serde_json::to_string(&response).unwrap();
    assert!(encoded.contains("\"kind\":\"file\""));
    let decoded: CommandResponse = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn initial_snapshot_serializes_every_status_badge() {
    let session = SessionController::default();
    let snapshot = session.snapshot();

    assert_eq!(snapshot.query, "");
    assert!(snapshot.results.is_empty());
    assert!(snapshot.selected().is_none());
    let badges: Vec<(Domain, IndexStatus, &str)> = snapshot
        .statuses
        .iter()
        .map(|badge| (badge.domain, badge.status, badge.label.as_str()))
        .collect();
    assert_eq!(
        badges,
        vec![
            (Domain::Applications, IndexStatus::NotCreated, "Not Created"),
            (Domain::Files, IndexStatus::NotCreated, "Not Created"),
        ]
    );

    let encoded = serde_json::to_string(&snapshot).unwrap();
    let decoded: SessionSnapshot = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, snapshot);
}

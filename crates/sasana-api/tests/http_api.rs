//! End-to-end HTTP tests over the in-memory store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sasana_api::AppState;
use sasana_registry::{MemoryStore, RegistryService};

fn app() -> Router {
    sasana_api::app(AppState::new(RegistryService::new(MemoryStore::new())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn actor_body(actor: &str, version: u64) -> Value {
    json!({ "actor": actor, "version": version })
}

/// Drive a record through its whole workflow; returns (id, version).
async fn issue_record(app: &Router, kind: &str, code: &str, scan: bool) -> (i64, u64) {
    let (status, record) = post(
        app,
        &format!("/v1/records/{kind}"),
        json!({ "code": code, "actor": "clerk", "location": "Kandy" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{record}");
    let id = record["id"].as_i64().unwrap();
    let base = format!("/v1/records/{kind}/{id}");

    let (_, r) = post(app, &format!("{base}/submit"), actor_body("clerk", 1)).await;
    let (_, r) = post(
        app,
        &format!("{base}/approve"),
        actor_body("U1", r["version"].as_u64().unwrap()),
    )
    .await;
    let (_, r) = post(
        app,
        &format!("{base}/print"),
        actor_body("printer", r["version"].as_u64().unwrap()),
    )
    .await;
    let r = if scan {
        let (_, r) = post(
            app,
            &format!("{base}/scan"),
            json!({
                "actor": "scanner",
                "version": r["version"].as_u64().unwrap(),
                "document": format!("scan/{code}.pdf"),
            }),
        )
        .await;
        r
    } else {
        r
    };
    let (status, r) = post(
        app,
        &format!("{base}/complete"),
        actor_body("registrar", r["version"].as_u64().unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{r}");
    (id, r["version"].as_u64().unwrap())
}

#[tokio::test]
async fn test_temple_lifecycle_over_http() {
    let app = app();
    let (id, version) = issue_record(&app, "temple", "TRN0000099", true).await;

    let (status, record) = get(&app, &format!("/v1/records/temple/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "Completed");
    assert_eq!(record["approval"], "Approved");
    assert_eq!(record["scanned_document"], "scan/TRN0000099.pdf");
    // created + five transitions
    assert_eq!(version, 6);
}

#[tokio::test]
async fn test_high_ordination_completes_without_scan() {
    let app = app();
    let (id, _) = issue_record(&app, "high_ordination_monk", "UPS2026000001", false).await;
    let (_, record) = get(&app, &format!("/v1/records/high_ordination_monk/{id}")).await;
    assert_eq!(record["status"], "Completed");
    assert!(record["scanned"].is_null());
}

#[tokio::test]
async fn test_stale_version_conflict_carries_stored_version() {
    let app = app();
    let (_, record) = post(
        &app,
        "/v1/records/temple",
        json!({ "code": "TRN0000001", "actor": "clerk" }),
    )
    .await;
    let id = record["id"].as_i64().unwrap();
    let base = format!("/v1/records/temple/{id}");
    let (_, r) = post(&app, &format!("{base}/submit"), actor_body("clerk", 1)).await;
    let read = r["version"].as_u64().unwrap();

    // two administrators decide from the same read
    let (status, _) = post(&app, &format!("{base}/approve"), actor_body("U1", read)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post(
        &app,
        &format!("{base}/reject"),
        json!({ "actor": "U2", "version": read, "reason": "late" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["stale_version"]["read"], read);
    assert_eq!(body["error"]["stale_version"]["stored"], read + 1);

    // the winner's decision stands
    let (_, record) = get(&app, &base).await;
    assert_eq!(record["status"], "Approved");
}

#[tokio::test]
async fn test_print_without_approval_is_precondition_failed() {
    let app = app();
    let (_, record) = post(
        &app,
        "/v1/records/devala",
        json!({ "code": "DVN2026000001", "actor": "clerk" }),
    )
    .await;
    let id = record["id"].as_i64().unwrap();
    let (status, _) = post(
        &app,
        &format!("/v1/records/devala/{id}/print"),
        actor_body("printer", 1),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_queue_orders_pending_approval_first() {
    let app = app();
    let (_, a) = post(
        &app,
        "/v1/records/temple",
        json!({ "code": "TRN0000001", "actor": "clerk" }),
    )
    .await;
    let (_, b) = post(
        &app,
        "/v1/records/temple",
        json!({ "code": "TRN0000002", "actor": "clerk" }),
    )
    .await;
    let b_id = b["id"].as_i64().unwrap();
    post(
        &app,
        &format!("/v1/records/temple/{b_id}/submit"),
        actor_body("clerk", 1),
    )
    .await;

    let (status, queue) = get(&app, "/v1/records/temple").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = queue
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![b_id, a["id"].as_i64().unwrap()]);
}

#[tokio::test]
async fn test_objection_blocks_reprint_approval_with_details() {
    let app = app();
    let (monk_id, _) = issue_record(&app, "monk", "BH2026000001", true).await;

    // file and uphold a reprint restriction
    let (status, objection) = post(
        &app,
        "/v1/objections",
        json!({
            "subject_kind": "monk",
            "subject_id": monk_id,
            "objection_type": "REPRINT_RESTRICTION",
            "grounds": "identity dispute pending",
            "requester_name": "D. Perera",
            "actor": "clerk",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{objection}");
    let objection_id = objection["id"].as_str().unwrap().to_string();
    let (status, _) = post(
        &app,
        &format!("/v1/objections/{objection_id}/approve"),
        actor_body("U1", 1),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the screen reports the veto
    let (status, screen) = get(
        &app,
        &format!("/v1/records/monk/{monk_id}/blocking?operation=REPRINT_APPROVAL"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(screen["blocked"], true);
    assert_eq!(screen["objection"]["requester"], "D. Perera");

    // and reprint approval is refused with the same details
    let (status, reprint) = post(
        &app,
        "/v1/reprints",
        json!({
            "subject_kind": "monk",
            "subject_id": monk_id,
            "amount_cents": 5000,
            "actor": "counter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{reprint}");
    let reprint_id = reprint["id"].as_str().unwrap().to_string();
    let (status, body) = post(
        &app,
        &format!("/v1/reprints/{reprint_id}/approve"),
        actor_body("U1", 1),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["objection"]["objection_type"],
        "REPRINT_RESTRICTION"
    );
    assert_eq!(body["error"]["objection"]["reason"], "identity dispute pending");

    // cancelling the objection unblocks
    let (status, _) = post(
        &app,
        &format!("/v1/objections/{objection_id}/cancel"),
        json!({ "actor": "U1", "version": 2, "reason": "dispute settled" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, approved) = post(
        &app,
        &format!("/v1/reprints/{reprint_id}/approve"),
        actor_body("U1", 1),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{approved}");
    assert_eq!(approved["status"], "Approved");
}

#[tokio::test]
async fn test_reprint_requires_completed_credential() {
    let app = app();
    let (_, record) = post(
        &app,
        "/v1/records/nun",
        json!({ "code": "BHN2026000001", "actor": "clerk" }),
    )
    .await;
    let (status, _) = post(
        &app,
        "/v1/reprints",
        json!({
            "subject_kind": "nun",
            "subject_id": record["id"].as_i64().unwrap(),
            "amount_cents": 5000,
            "actor": "counter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_institution_reprint_subject_rejected() {
    let app = app();
    let (_, _) = issue_record(&app, "temple", "TRN0000005", true).await;
    let (status, _) = post(
        &app,
        "/v1/reprints",
        json!({
            "subject_kind": "temple",
            "subject_id": 1,
            "amount_cents": 5000,
            "actor": "counter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_kind_is_bad_request() {
    let app = app();
    let (status, _) = get(&app, "/v1/records/pagoda").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app = app();
    let (status, _) = get(&app, "/v1/records/monk/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_residency_restriction_blocks_add_resident() {
    let app = app();
    let (monk_id, _) = issue_record(&app, "monk", "BH2026000002", true).await;
    let (_, arama) = post(
        &app,
        "/v1/records/arama",
        json!({ "code": "ARN2026000001", "actor": "clerk" }),
    )
    .await;
    let arama_id = arama["id"].as_i64().unwrap();

    let (_, objection) = post(
        &app,
        "/v1/objections",
        json!({
            "subject_kind": "arama",
            "subject_id": arama_id,
            "objection_type": "RESIDENCY_RESTRICTION",
            "grounds": "court order on residency",
            "requester_name": "Provincial council",
            "actor": "clerk",
        }),
    )
    .await;
    let objection_id = objection["id"].as_str().unwrap();
    post(
        &app,
        &format!("/v1/objections/{objection_id}/approve"),
        actor_body("U1", 1),
    )
    .await;

    let (status, body) = post(
        &app,
        &format!("/v1/records/arama/{arama_id}/residents"),
        json!({
            "actor": "clerk",
            "version": 1,
            "resident_kind": "monk",
            "resident_id": monk_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["objection"]["objection_type"],
        "RESIDENCY_RESTRICTION"
    );
}

#[tokio::test]
async fn test_objections_remain_listable_after_soft_deletion() {
    let app = app();
    let (_, arama) = post(
        &app,
        "/v1/records/arama",
        json!({ "code": "ARN2026000002", "actor": "clerk" }),
    )
    .await;
    let arama_id = arama["id"].as_i64().unwrap();
    let (status, _) = post(
        &app,
        "/v1/objections",
        json!({
            "subject_kind": "arama",
            "subject_id": arama_id,
            "objection_type": "RESIDENCY_RESTRICTION",
            "grounds": "boundary dispute",
            "requester_name": "Provincial council",
            "actor": "clerk",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/v1/records/arama/{arama_id}"),
        Some(actor_body("U1", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the record no longer resolves, but its objections stay on file
    let (status, _) = get(&app, &format!("/v1/records/arama/{arama_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, objections) =
        get(&app, &format!("/v1/records/arama/{arama_id}/objections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(objections.as_array().unwrap().len(), 1);
    assert_eq!(objections[0]["objection_type"], "RESIDENCY_RESTRICTION");
}

#[tokio::test]
async fn test_reprints_listed_under_their_subject() {
    let app = app();
    let (monk_id, _) = issue_record(&app, "monk", "BH2026000003", true).await;
    let (status, reprint) = post(
        &app,
        "/v1/reprints",
        json!({
            "subject_kind": "monk",
            "subject_id": monk_id,
            "amount_cents": 5000,
            "actor": "counter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{reprint}");

    let (status, reprints) = get(&app, &format!("/v1/records/monk/{monk_id}/reprints")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reprints.as_array().unwrap().len(), 1);
    assert_eq!(reprints[0]["status"], "Pending");
    assert_eq!(reprints[0]["id"], reprint["id"]);

    // institutions never hold reprints
    let (temple_id, _) = issue_record(&app, "temple", "TRN0000007", true).await;
    let (status, reprints) =
        get(&app, &format!("/v1/records/temple/{temple_id}/reprints")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reprints.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_health_probes() {
    let app = app();
    let (status, body) = get(&app, "/health/liveness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, _) = get(&app, "/health/readiness").await;
    assert_eq!(status, StatusCode::OK);
}

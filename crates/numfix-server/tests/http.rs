use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use numfix_config::ServerConfig;
use numfix_core::CountryRegistry;
use numfix_server::{router, AppState};
use numfix_store::Store;
use serde_json::{json, Value};
use tower::ServiceExt;

fn migrated_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn app_with(store: Store) -> Router {
    router(AppState::new(
        store,
        CountryRegistry::builtin(),
        ServerConfig::default(),
    ))
}

fn app() -> Router {
    app_with(migrated_store())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_csv(uri: &str, payload: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn countries_lists_builtin_profiles() {
    let app = app();
    let (status, _, body) = send(&app, get("/countries")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 4);
    assert!(items
        .iter()
        .any(|item| item["code"] == "rsa" && item["dialing_prefix"] == "27"));
}

#[tokio::test]
async fn test_valid_number_returns_flag() {
    let app = app();
    let (status, _, body) = send(&app, get("/countries/rsa/test/27717278645")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true }));
}

#[tokio::test]
async fn test_fixable_number_returns_record() {
    let app = app();
    let (status, _, body) = send(&app, get("/countries/rsa/test/717278645")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number_provided"], "717278645");
    assert_eq!(body["number_fixed"], "27717278645");
    assert_eq!(body["valid"], false);
    assert_eq!(body["changes"], json!(["prepended number with 27"]));
}

#[tokio::test]
async fn test_rejected_number_returns_message() {
    let app = app();
    let (status, _, body) = send(&app, get("/countries/rsa/test/271")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "message": "invalid length 3, the length must be exactly 11" })
    );

    let (status, _, body) = send(&app, get("/countries/zzz/test/27717278645")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "country code zzz not found in lookup");
}

#[tokio::test]
async fn submit_then_read_back_batch() {
    let app = app();
    let payload = "id,sms_phone\n1,27717278645\n2,717278645\n3,271\n4,277172786457\n";
    let (status, _, summary) = send(&app, post_csv("/countries/rsa/numbers", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary["stats"],
        json!({
            "valid_numbers_count": 1,
            "fixed_numbers_count": 2,
            "invalid_numbers_count": 1,
            "total_numbers_processed": 4,
        })
    );
    let batch_ref = summary["ref"].as_str().expect("ref").to_string();
    assert_eq!(
        summary["href"],
        format!("http://localhost:8080/numbers/{}", batch_ref)
    );

    let (status, _, stats) = send(&app, get(&format!("/numbers/{}", batch_ref))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["ref"], batch_ref.as_str());
    assert_eq!(stats["stats"], summary["stats"]);

    let (status, headers, results) =
        send(&app, get(&format!("/numbers/{}/download", batch_ref))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename={}.json", batch_ref).as_str()
    );
    assert_eq!(
        results,
        json!({
            "valid_numbers": ["27717278645"],
            "fixed_numbers": [
                {
                    "original_number": "717278645",
                    "changes": "prepended number with 27",
                    "fixed_number": "27717278645",
                },
                {
                    "original_number": "277172786457",
                    "changes": "shortened number by removing 7",
                    "fixed_number": "27717278645",
                },
            ],
            "rejected_numbers": ["271"],
        })
    );
}

#[tokio::test]
async fn submit_with_unknown_country_rejects_every_row() {
    let app = app();
    let payload = "id,sms_phone\n1,27717278645\n2,717278645\n";
    let (status, _, summary) = send(&app, post_csv("/countries/zzz/numbers", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["stats"]["invalid_numbers_count"], 2);
    assert_eq!(summary["stats"]["total_numbers_processed"], 2);
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let app = app();
    let payload = "id,sms_phone\n1,27717278645\n2,717278645,extra\n";
    let (status, _, body) = send(&app, post_csv("/countries/rsa/numbers", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .starts_with("malformed payload"));
}

#[tokio::test]
async fn unknown_batch_is_not_found() {
    let app = app();
    let missing = "6f1c2b0e-4a7d-4c1e-9a53-2f0e8d7b9c10";
    let (status, _, body) = send(&app, get(&format!("/numbers/{}", missing))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().expect("message").contains(missing));

    let (status, _, _) = send(&app, get(&format!("/numbers/{}/download", missing))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_batch_ref_is_bad_request() {
    let app = app();
    let (status, _, body) = send(&app, get("/numbers/not-a-ref")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid batch reference: not-a-ref");
}

#[tokio::test]
async fn persistence_failure_is_masked_as_internal_error() {
    let store = migrated_store();
    store
        .connection()
        .execute_batch("DROP TABLE fixed_numbers;")
        .expect("drop table");
    let app = app_with(store);

    let payload = "id,sms_phone\n1,27717278645\n2,717278645\n";
    let (status, _, body) = send(&app, post_csv("/countries/rsa/numbers", payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "internal error" }));
}

#[tokio::test]
async fn href_follows_listen_address_without_public_url() {
    let server = ServerConfig {
        listen: "0.0.0.0:9000".parse().expect("addr"),
        public_url: None,
    };
    let app = router(AppState::new(migrated_store(), CountryRegistry::builtin(), server));

    let payload = "id,sms_phone\n1,27717278645\n";
    let (status, _, summary) = send(&app, post_csv("/countries/rsa/numbers", payload)).await;
    assert_eq!(status, StatusCode::OK);
    let batch_ref = summary["ref"].as_str().expect("ref");
    assert_eq!(
        summary["href"],
        format!("http://localhost:9000/numbers/{}", batch_ref)
    );
}

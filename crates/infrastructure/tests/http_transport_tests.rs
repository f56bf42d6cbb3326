use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use fleetctl_domain::{OperationTransport, OutboundRequest};
use fleetctl_infrastructure::HttpOperationTransport;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn accept(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    captured.requests.lock().unwrap().push((headers, body));
    StatusCode::NO_CONTENT
}

async fn reply_json() -> Json<Value> {
    Json(json!({"success": false}))
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn start_server(captured: Captured) -> String {
    let app = Router::new()
        .route("/v1/relay-server-replacement", post(accept))
        .route("/v1/json", post(reply_json))
        .route("/v1/reject", post(reject))
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn request(url: String) -> OutboundRequest {
    OutboundRequest {
        url,
        headers: vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("user".to_string(), "operator".to_string()),
            ("originator".to_string(), "DeviceInventory".to_string()),
            ("x-correlator".to_string(), "c-1".to_string()),
            ("trace-indicator".to_string(), "1.1".to_string()),
            ("customer-journey".to_string(), "unknown".to_string()),
            ("operation-key".to_string(), "k1".to_string()),
        ],
        body: json!({"future-release-number": "2.0.0"}),
    }
}

#[tokio::test]
async fn test_send_forwards_headers_and_body() {
    let captured = Captured::default();
    let base = start_server(captured.clone()).await;
    let transport = HttpOperationTransport::new(Some(Duration::from_secs(5))).unwrap();

    let response = transport
        .send(request(format!("{base}/v1/relay-server-replacement")))
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
    assert!(response.is_success());

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["operation-key"], "k1");
    assert_eq!(headers["trace-indicator"], "1.1");
    assert_eq!(headers["x-correlator"], "c-1");
    assert_eq!(headers["originator"], "DeviceInventory");
    assert_eq!(body["future-release-number"], "2.0.0");
}

#[tokio::test]
async fn test_send_parses_json_and_ignores_non_json() {
    let base = start_server(Captured::default()).await;
    let transport = HttpOperationTransport::new(None).unwrap();

    let response = transport
        .send(request(format!("{base}/v1/json")))
        .await
        .unwrap();
    assert_eq!(response.body, Some(json!({"success": false})));

    // 非 2xx 仍然是一次完成的调用
    let response = transport
        .send(request(format!("{base}/v1/reject")))
        .await
        .unwrap();
    assert_eq!(response.status, 500);
    assert!(response.body.is_none());
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_connection_failure_is_dispatch_error() {
    let transport = HttpOperationTransport::new(Some(Duration::from_secs(2))).unwrap();

    let err = transport
        .send(request("http://127.0.0.1:1/v1/unreachable".to_string()))
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

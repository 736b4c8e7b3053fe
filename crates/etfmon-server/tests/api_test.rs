//! Integration tests for the HTTP endpoints.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use etfmon::{ConstituentValidator, EtfAnalyzer, PriceStore};
use etfmon_server::routes::create_router;
use etfmon_server::{Server, ServerConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../etfmon-data/tests/data/prices.csv"
);
const BOUNDARY: &str = "etfmon-test-boundary";

fn analyzer_for(path: &str) -> EtfAnalyzer {
    EtfAnalyzer::new(
        Arc::new(PriceStore::from_csv(path)),
        ConstituentValidator::default(),
    )
}

fn app() -> Router {
    create_router(analyzer_for(FIXTURE))
}

fn multipart_body(field: &str, filename: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn upload_request(field: &str, content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/py/v1/etfs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, "etf.csv", content)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_upload_success() {
    let (status, json) = send(app(), upload_request("file", "name,weight\nA,0.5\nB,0.3\nC,0.2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["table_data"].as_array().unwrap().len(), 3);
    assert_eq!(json["table_data"][0]["symbol"], "A");
    assert_eq!(json["table_data"][0]["latest_price"], 104.0);
    assert_eq!(json["time_series"].as_array().unwrap().len(), 5);
    assert_eq!(json["time_series"][0]["date"], "2024-01-01");
    assert!((json["time_series"][0]["price"].as_f64().unwrap() - 80.0).abs() < 1e-9);
    assert!(json["top_holdings"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn test_upload_validation_failure() {
    let (status, json) = send(app(), upload_request("file", "name,weight\nA,0.3\nB,0.4\nA,0.3")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("ETF data validation failed:\n- "));
    assert!(detail.contains("Duplicate symbols found: A"));
}

#[tokio::test]
async fn test_upload_reports_every_rule() {
    let (status, json) = send(
        app(),
        upload_request("file", "name,weight\nA,0.5\nB,-0.2\nUNKNOWN_SYMBOL,0.2"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("negative"));
    assert!(detail.contains("Weight sum validation failed"));
    assert!(detail.contains("UNKNOWN_SYMBOL"));
}

#[tokio::test]
async fn test_upload_parse_failure() {
    let (status, json) = send(app(), upload_request("file", "symbol,percentage\nA,1.0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("'name'"));
    assert!(detail.contains("'weight'"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (status, json) = send(app(), upload_request("attachment", "name,weight\nA,1.0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn test_upload_with_missing_price_file() {
    let app = create_router(analyzer_for("no/such/prices.csv"));
    let (status, json) = send(app, upload_request("file", "name,weight\nA,1.0")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["detail"], "Price data unavailable");
}

#[tokio::test]
async fn test_health_reports_data_loaded() {
    let analyzer = analyzer_for(FIXTURE);
    let app = create_router(analyzer.clone());

    let (status, json) = send(app.clone(), get("/api/py/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "etf-api");
    assert_eq!(json["version"], "v1");
    assert_eq!(json["data_loaded"], false);

    analyzer.store().load().unwrap();
    let (_, json) = send(app, get("/api/py/v1/health")).await;
    assert_eq!(json["data_loaded"], true);
}

#[tokio::test]
async fn test_api_root() {
    let (status, json) = send(app(), get("/api/py")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["versions"]["v1"], "/api/py/v1");
    assert!(json["name"].is_string());
    assert!(json["version"].is_string());
    assert!(json["documentation"].is_string());
}

#[tokio::test]
async fn test_server_router_allows_any_origin() {
    let server = Server::new(ServerConfig::default(), analyzer_for(FIXTURE));
    let request = Request::builder()
        .uri("/api/py/v1/health")
        .header("origin", "https://example.com")
        .body(Body::empty())
        .unwrap();

    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

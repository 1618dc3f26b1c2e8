//! Dashboard endpoints against a stub browser and a local prediction API

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use pillsquad_core::{CertifiedProductEntry, CertifiedRegistry, Error};
use pillsquad_dashboard::{build_app, DashboardConfig, DashboardState};
use pillsquad_tools::PageRenderer;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "pillsquad-dashboard-boundary";

struct StubRenderer {
    html: String,
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn page_source(&self, _url: &str) -> pillsquad_core::Result<String> {
        Ok(self.html.clone())
    }

    async fn screenshot(&self, _url: &str) -> pillsquad_core::Result<Vec<u8>> {
        Err(Error::browser("not used"))
    }
}

struct BrokenRenderer;

#[async_trait]
impl PageRenderer for BrokenRenderer {
    async fn page_source(&self, _url: &str) -> pillsquad_core::Result<String> {
        Err(Error::browser("chrome not reachable"))
    }

    async fn screenshot(&self, _url: &str) -> pillsquad_core::Result<Vec<u8>> {
        Err(Error::browser("chrome not reachable"))
    }
}

/// Stand-in prediction API plus an image host
async fn spawn_api() -> SocketAddr {
    let app = Router::new()
        .route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                if body["company_name"] == "" && body["ingredients"].is_null() {
                    return Json(json!({ "error": "회사명 또는 원료명을 입력해주세요." }));
                }
                Json(json!({
                    "input": "시부트라민 코스맥스",
                    "prediction": "신고업체",
                    "confidence": 0.93
                }))
            }),
        )
        .route(
            "/predict-company",
            post(|| async { Json(json!({ "label": "안심", "probability": 0.12 })) }),
        )
        .route(
            "/classify-image",
            post(|| async { Json(json!({ "result": "No" })) }),
        )
        .route("/img/ok.jpg", get(|| async { vec![0xffu8, 0xd8, 0xff] }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn page(body_text: &str) -> String {
    let images: String = (1..=8)
        .map(|i| format!(r#"<img src="/img/{i}.jpg">"#))
        .collect();
    format!("<html><body><p>{body_text}</p>{images}</body></html>")
}

async fn app_with(renderer: Arc<dyn PageRenderer>) -> (Router, SocketAddr) {
    let addr = spawn_api().await;
    let mut config = DashboardConfig::default();
    config.api.base_url = format!("http://{addr}");

    let registry = CertifiedRegistry::from_entries([
        CertifiedProductEntry::new("시아플렉스", "(주)코스맥스바이오"),
        CertifiedProductEntry::new("시아플렉스 골드", "(주)노바렉스"),
    ])
    .unwrap();

    let state = DashboardState::new(config, Arc::new(registry), renderer).unwrap();
    (build_app(state), addr)
}

async fn app() -> (Router, SocketAddr) {
    app_with(Arc::new(StubRenderer {
        html: page("관절 건강 시아플렉스"),
    }))
    .await
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app().await;
    let (status, body) = call(app, Request::get("/api/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["certified_products"], 2);
}

#[tokio::test]
async fn test_index_served_for_unknown_paths() {
    let (app, _) = app().await;
    let response = app
        .oneshot(Request::get("/anything").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains("영양제 분류 통합 서비스"));
}

#[tokio::test]
async fn test_analyze_rejects_other_sites() {
    let (app, _) = app().await;
    let (status, body) = call(
        app,
        post_json("/api/analyze", json!({ "url": "https://www.coupang.com/vp/products/1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["level"], "warning");
    assert_eq!(body["notice"]["message"], "⚠️ 중고나라 URL이 아닙니다.");
    assert_eq!(body["image_urls"], json!([]));
}

#[tokio::test]
async fn test_analyze_joongna_page() {
    let (app, _) = app().await;
    let (status, body) = call(
        app,
        post_json("/api/analyze", json!({ "url": "https://web.joongna.com/product/1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("notice").is_none());
    assert_eq!(body["text_preview"], "관절 건강 시아플렉스");

    let urls = body["image_urls"].as_array().unwrap();
    assert_eq!(urls.len(), 6);
    assert_eq!(urls[0], "https://web.joongna.com/img/1.jpg");
}

#[tokio::test]
async fn test_analyze_browser_failure() {
    let (app, _) = app_with(Arc::new(BrokenRenderer)).await;
    let (status, body) = call(
        app,
        post_json("/api/analyze", json!({ "url": "https://web.joongna.com/product/1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("chrome not reachable"));
}

#[tokio::test]
async fn test_certify() {
    let (app, _) = app().await;
    let (status, body) = call(
        app.clone(),
        post_json("/api/certify", json!({ "product_name": "시아플렉스" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["certified"], true);
    assert_eq!(body["matches"].as_array().unwrap().len(), 2);

    let (_, body) = call(
        app.clone(),
        post_json("/api/certify", json!({ "product_name": "없는제품" })),
    )
    .await;
    assert_eq!(body["certified"], false);
    assert_eq!(body["message"], "❌ 식약처 인증되지 않은 제품입니다.");

    let (status, _) = call(app, post_json("/api/certify", json!({ "product_name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict() {
    let (app, _) = app().await;
    let (_, body) = call(
        app.clone(),
        post_json(
            "/api/predict",
            json!({ "company_name": "코스맥스", "ingredients": "시부트라민, " }),
        ),
    )
    .await;
    assert_eq!(body["level"], "success");
    assert_eq!(body["message"], "🧠 예측 결과: 신고업체 (확률: 0.93)");
    assert_eq!(body["detail"], "입력 문장: 시부트라민 코스맥스");

    let (_, body) = call(
        app,
        post_json("/api/predict", json!({ "company_name": "", "ingredients": " , " })),
    )
    .await;
    assert_eq!(body["level"], "warning");
    assert_eq!(body["message"], "회사명 또는 원료명을 하나 이상 입력해주세요.");
}

#[tokio::test]
async fn test_predict_company() {
    let (app, _) = app().await;
    let (_, body) = call(
        app.clone(),
        post_json("/api/predict-company", json!({ "company": "한국건강", "ceo": "", "address": "" })),
    )
    .await;
    assert_eq!(body["level"], "success");
    assert_eq!(body["message"], "예측 결과: 안심 (확률: 0.12)");

    let (_, body) = call(app, post_json("/api/predict-company", json!({}))).await;
    assert_eq!(body["level"], "warning");
}

#[tokio::test]
async fn test_classify_url() {
    let (app, addr) = app().await;
    let (_, body) = call(
        app.clone(),
        post_json("/api/classify-url", json!({ "image_url": format!("http://{addr}/img/ok.jpg") })),
    )
    .await;
    assert_eq!(body["level"], "info");
    assert_eq!(body["message"], "분석 결과: No");

    let (_, body) = call(
        app,
        post_json("/api/classify-url", json!({ "image_url": format!("http://{addr}/img/gone.jpg") })),
    )
    .await;
    assert_eq!(body["level"], "error");
    assert_eq!(body["message"], "이미지 다운로드 실패: 404");
}

#[tokio::test]
async fn test_classify_upload() {
    let (app, _) = app().await;

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"pill.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::post("/api/classify-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "success");
    assert_eq!(body["message"], "👉 결과: No");
}

#[tokio::test]
async fn test_classify_upload_without_file() {
    let (app, _) = app().await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::post("/api/classify-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _) = call(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

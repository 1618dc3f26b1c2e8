use crate::state::DashboardState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pillsquad_core::{CertifiedProductEntry, CompanyRequest, ErrorBody, IngredientRequest};
use pillsquad_tools::scrape;
use pillsquad_tools::toolbox::{display_field, format_certification};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Page text longer than this gets an ellipsis after the preview
const PREVIEW_ELLIPSIS_OVER: usize = 1000;

/// Message shown to the user, styled by `level`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Notice {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ============================================================================
// Health
// ============================================================================

pub async fn health(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "certified_products": state.registry.len(),
        "api": state.client.base_url(),
    }))
}

// ============================================================================
// Page analysis
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub text_preview: String,
    pub image_urls: Vec<String>,
}

pub async fn analyze(
    State(state): State<DashboardState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, DashboardError> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(DashboardError::BadRequest("분석할 URL을 입력하세요.".to_string()));
    }

    if !url.contains(state.config.allowed_host.as_str()) {
        return Ok(Json(AnalyzeResponse {
            notice: Some(Notice::new(Level::Warning, "⚠️ 중고나라 URL이 아닙니다.")),
            ..Default::default()
        }));
    }

    let html = state
        .renderer
        .page_source(url)
        .await
        .map_err(|e| DashboardError::Upstream(e.to_string()))?;

    let text = scrape::visible_text(&html);
    let mut image_urls = scrape::image_urls(&html, url);
    image_urls.truncate(state.config.max_images);
    debug!(url, chars = text.chars().count(), images = image_urls.len(), "page analyzed");

    Ok(Json(AnalyzeResponse {
        notice: None,
        text_preview: preview(&text, state.config.preview_chars),
        image_urls,
    }))
}

/// First `chars` characters of `text`
pub fn preview(text: &str, chars: usize) -> String {
    let mut out: String = text.chars().take(chars).collect();
    if text.chars().count() > PREVIEW_ELLIPSIS_OVER {
        out.push_str("...");
    }
    out
}

// ============================================================================
// Certification
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CertifyRequest {
    pub product_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CertifyResponse {
    pub certified: bool,
    pub message: String,
    pub matches: Vec<CertifiedProductEntry>,
}

pub async fn certify(
    State(state): State<DashboardState>,
    Json(req): Json<CertifyRequest>,
) -> Result<Json<CertifyResponse>, DashboardError> {
    if req.product_name.trim().is_empty() {
        return Err(DashboardError::BadRequest("제품명을 입력하세요.".to_string()));
    }

    let matches = state.registry.lookup(&req.product_name);
    Ok(Json(CertifyResponse {
        certified: !matches.is_empty(),
        message: format_certification(&matches),
        matches: matches.into_iter().cloned().collect(),
    }))
}

// ============================================================================
// Predictions
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub company_name: String,

    /// Comma-separated ingredient names
    #[serde(default)]
    pub ingredients: String,
}

/// Split a comma-separated list, dropping blanks
pub fn parse_ingredients(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn predict(
    State(state): State<DashboardState>,
    Json(form): Json<PredictForm>,
) -> Json<Notice> {
    let ingredients = parse_ingredients(&form.ingredients);
    if form.company_name.is_empty() && ingredients.is_empty() {
        return Json(Notice::new(
            Level::Warning,
            "회사명 또는 원료명을 하나 이상 입력해주세요.",
        ));
    }

    let request = IngredientRequest {
        ingredients: (!ingredients.is_empty()).then_some(ingredients),
        company_name: Some(form.company_name),
    };

    let notice = match state.client.predict_ingredients(&request).await {
        Ok(resp) if resp.status.is_success() => match resp.json::<Value>() {
            Ok(data) if data.get("prediction").is_some() => Notice::new(
                Level::Success,
                format!(
                    "🧠 예측 결과: {} (확률: {})",
                    display_field(&data, "prediction"),
                    display_field(&data, "confidence")
                ),
            )
            .with_detail(format!("입력 문장: {}", display_field(&data, "input"))),
            Ok(data) => Notice::new(Level::Error, display_field(&data, "error")),
            Err(e) => Notice::new(Level::Error, format!("API 연결 오류: {e}")),
        },
        Ok(resp) => Notice::new(
            Level::Error,
            format!("API 요청 실패: {} {}", resp.status.as_u16(), resp.body),
        ),
        Err(e) => Notice::new(Level::Error, format!("API 연결 오류: {e}")),
    };
    Json(notice)
}

pub async fn predict_company(
    State(state): State<DashboardState>,
    Json(req): Json<CompanyRequest>,
) -> Json<Notice> {
    if req.is_empty() {
        return Json(Notice::new(Level::Warning, "하나 이상의 정보를 입력하세요."));
    }

    let notice = match state.client.predict_company(&req).await {
        Ok(resp) if resp.status.is_success() => match resp.json::<Value>() {
            Ok(data) => Notice::new(
                Level::Success,
                format!(
                    "예측 결과: {} (확률: {})",
                    display_field(&data, "label"),
                    display_field(&data, "probability")
                ),
            ),
            Err(e) => Notice::new(Level::Error, format!("API 연결 오류: {e}")),
        },
        Ok(resp) => {
            warn!(status = resp.status.as_u16(), "company prediction failed");
            Notice::new(Level::Error, "API 요청 실패")
        }
        Err(e) => Notice::new(Level::Error, format!("API 연결 오류: {e}")),
    };
    Json(notice)
}

// ============================================================================
// Image classification
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyUrlRequest {
    pub image_url: String,
}

/// Fetch a page image and classify it
pub async fn classify_url(
    State(state): State<DashboardState>,
    Json(req): Json<ClassifyUrlRequest>,
) -> Json<Notice> {
    let bytes = match state.http.get(&req.image_url).send().await {
        Ok(resp) if resp.status() == reqwest::StatusCode::OK => match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return Json(Notice::new(Level::Error, format!("이미지 다운로드 실패: {e}"))),
        },
        Ok(resp) => {
            return Json(Notice::new(
                Level::Error,
                format!("이미지 다운로드 실패: {}", resp.status().as_u16()),
            ))
        }
        Err(e) => return Json(Notice::new(Level::Error, format!("이미지 다운로드 실패: {e}"))),
    };

    let notice = match state
        .client
        .classify_image(bytes, "image.jpg", "image/jpeg")
        .await
    {
        Ok(resp) if resp.status.is_success() => match resp.json::<Value>() {
            Ok(data) => Notice::new(
                Level::Info,
                format!("분석 결과: {}", display_field(&data, "result")),
            ),
            Err(e) => Notice::new(Level::Error, format!("API 호출 실패: {e}")),
        },
        Ok(resp) => Notice::new(
            Level::Error,
            format!("API 호출 실패: {} {}", resp.status.as_u16(), resp.body),
        ),
        Err(e) => Notice::new(Level::Error, format!("API 호출 실패: {e}")),
    };
    Json(notice)
}

/// Classify an uploaded image (multipart field `file`)
pub async fn classify_upload(
    State(state): State<DashboardState>,
    mut multipart: Multipart,
) -> Result<Json<Notice>, DashboardError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let mime = match field.content_type() {
            Some(ct) if ct.starts_with("image/") => ct.to_string(),
            _ => mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string(),
        };
        upload = Some((field.bytes().await?, file_name, mime));
        break;
    }

    let (bytes, file_name, mime) = upload
        .ok_or_else(|| DashboardError::BadRequest("이미지를 업로드하세요.".to_string()))?;
    debug!(file_name, size = bytes.len(), "upload received");

    let notice = match state
        .client
        .classify_image(bytes.to_vec(), &file_name, &mime)
        .await
    {
        Ok(resp) if resp.status.is_success() => match resp.json::<Value>() {
            Ok(data) => Notice::new(
                Level::Success,
                format!("👉 결과: {}", display_field(&data, "result")),
            ),
            Err(_) => Notice::new(Level::Error, "API 요청 실패"),
        },
        Ok(_) => Notice::new(Level::Error, "API 요청 실패"),
        Err(e) => Notice::new(Level::Error, format!("API 연결 오류: {e}")),
    };
    Ok(Json(notice))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum DashboardError {
    BadRequest(String),
    /// Browser or other upstream failure
    Upstream(String),
    Rejected(StatusCode, String),
}

impl From<MultipartError> for DashboardError {
    fn from(err: MultipartError) -> Self {
        DashboardError::Rejected(err.status(), err.body_text())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DashboardError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            DashboardError::Upstream(msg) => {
                warn!("upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            DashboardError::Rejected(status, msg) => (status, msg),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients() {
        assert_eq!(
            parse_ingredients(" 은행잎추출물, 프락토올리고당 ,, 밀크씨슬추출물 "),
            vec!["은행잎추출물", "프락토올리고당", "밀크씨슬추출물"]
        );
        assert!(parse_ingredients(" , ").is_empty());
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("짧은 글", 100), "짧은 글");

        let medium = "가".repeat(500);
        assert_eq!(preview(&medium, 100), "가".repeat(100));

        let long = "가".repeat(1001);
        assert_eq!(preview(&long, 100), format!("{}...", "가".repeat(100)));
    }

    #[test]
    fn test_notice_serialization() {
        let notice = Notice::new(Level::Warning, "경고");
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            serde_json::json!({ "level": "warning", "message": "경고" })
        );
    }
}

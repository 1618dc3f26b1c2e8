//! The operations behind every agent tool
//!
//! Operations the agent should see as plain answers return `String`
//! messages (remote API failures included). Operations that can fail in the
//! browser or on the network return `Result` and let the caller decide.

use crate::browser::PageRenderer;
use crate::client::PredictionClient;
use crate::config::{DownloadMode, ToolsConfig};
use crate::scrape::{self, MAX_TEXT_CHARS};
use pillsquad_core::{
    CertifiedProductEntry, CertifiedRegistry, CompanyRequest, Error, Result, ScrapeResult,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name used when the URL has no usable last segment
pub const DEFAULT_IMAGE_NAME: &str = "downloaded.jpg";

pub struct ToolBox {
    registry: Arc<CertifiedRegistry>,
    client: PredictionClient,
    http: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
    output_dir: PathBuf,
    download_mode: DownloadMode,
}

impl ToolBox {
    pub fn new(
        config: &ToolsConfig,
        registry: Arc<CertifiedRegistry>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            registry,
            client: PredictionClient::new(config.api.clone()),
            http,
            renderer,
            output_dir: config.output_dir.clone(),
            download_mode: config.download_mode,
        })
    }

    /// Certification lookup by (partial) product name
    pub fn check_certified_product(&self, product_name: &str) -> String {
        format_certification(&self.registry.lookup(product_name))
    }

    /// Company-origin prediction through the remote API
    pub async fn predict_company_label(&self, company: &str, ceo: &str, address: &str) -> String {
        let request = CompanyRequest::new(company, ceo, address);
        if request.is_empty() {
            return "하나 이상의 정보를 입력하세요.".to_string();
        }

        let response = match self.client.predict_company(&request).await {
            Ok(response) => response,
            Err(e) => return format!("API 연결 오류: {}", remote_detail(&e)),
        };
        if !response.is_ok() {
            return format!("API 오류: {} {}", response.status.as_u16(), response.body);
        }

        match response.json::<Value>() {
            Ok(data) => format!(
                "예측 결과: {} (확률: {})",
                display_field(&data, "label"),
                display_field(&data, "probability")
            ),
            Err(e) => format!("API 연결 오류: {}", remote_detail(&e)),
        }
    }

    /// Upload a local image to the remote classifier
    pub async fn analyze_image(&self, image_path: &str) -> String {
        let path = Path::new(image_path);
        if !path.is_file() {
            return format!("❌ 파일이 존재하지 않습니다: {image_path}");
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return format!("❌ 이미지 분석 중 예외 발생: {e}"),
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_IMAGE_NAME);

        match self
            .client
            .classify_image(bytes, file_name, mime_for(path))
            .await
        {
            Ok(response) if response.is_ok() => {
                format!("✅ 분석 결과: {}", response.body.trim())
            }
            Ok(response) => format!(
                "❌ API 오류: {} {}",
                response.status.as_u16(),
                response.body.trim()
            ),
            Err(e) => format!("❌ 이미지 분석 중 예외 발생: {}", remote_detail(&e)),
        }
    }

    /// Fetch a page over plain HTTP, extract its text and scan it for certified products
    pub async fn extract_text(&self, page_url: &str) -> Result<ScrapeResult> {
        let html = self
            .http
            .get(page_url)
            .send()
            .await
            .map_err(|e| Error::remote_call(e.to_string()))?
            .text()
            .await
            .map_err(|e| Error::remote_call(e.to_string()))?;

        let full_text = scrape::visible_text(&html);
        let certification_matches = self
            .registry
            .scan_text(&full_text)
            .into_iter()
            .cloned()
            .collect();

        Ok(ScrapeResult {
            page_text: scrape::truncate_text(&full_text, MAX_TEXT_CHARS),
            image_urls: scrape::image_urls(&html, page_url),
            certification_matches,
        })
    }

    /// Image URLs of a page rendered in the browser
    pub async fn crawl_image_urls(&self, page_url: &str) -> Result<Vec<String>> {
        let html = self.renderer.page_source(page_url).await?;
        let urls = scrape::image_urls(&html, page_url);
        info!(page_url, count = urls.len(), "image URLs collected");
        Ok(urls)
    }

    /// Save an image under the output directory using the configured mode
    pub async fn download_image(&self, url: &str, save_path: Option<&str>) -> Result<PathBuf> {
        self.download_image_with(url, save_path, self.download_mode)
            .await
    }

    pub async fn download_image_with(
        &self,
        url: &str,
        save_path: Option<&str>,
        mode: DownloadMode,
    ) -> Result<PathBuf> {
        let target = self.output_dir.join(target_file_name(url, save_path));
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let bytes = match mode {
            DownloadMode::Direct => self.fetch_image(url).await?,
            DownloadMode::Screenshot => self.renderer.screenshot(url).await?,
        };

        tokio::fs::write(&target, &bytes).await?;
        debug!(url, path = %target.display(), ?mode, "image saved");
        Ok(target)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::remote_call(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::remote_call(e.to_string()))?;

        image::guess_format(&bytes)
            .map_err(|_| Error::invalid_image(format!("{url} did not return an image")))?;
        Ok(bytes.to_vec())
    }

    /// Crawl a page, download every image and analyze each one
    pub async fn analyze_images_from_url(&self, page_url: &str) -> Result<String> {
        let urls = self.crawl_image_urls(page_url).await?;
        if urls.is_empty() {
            return Ok("❌ 페이지에서 이미지를 찾지 못했습니다.".to_string());
        }

        let mut lines = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            // Numbered names keep repeated file names on one page apart
            let name = format!("{}_{}", i + 1, target_file_name(url, None));
            let outcome = match self
                .download_image_with(url, Some(&name), DownloadMode::Direct)
                .await
            {
                Ok(path) => self.analyze_image(&path.to_string_lossy()).await,
                Err(e) => {
                    warn!(url, "image download failed: {}", e);
                    format!("❌ 이미지 다운로드 실패: {e}")
                }
            };
            lines.push(format!("{}. {} → {}", i + 1, url, outcome));
        }
        Ok(lines.join("\n"))
    }
}

/// `✅` line per match, or the not-certified message
pub fn format_certification(matches: &[&CertifiedProductEntry]) -> String {
    if matches.is_empty() {
        return "❌ 식약처 인증되지 않은 제품입니다.".to_string();
    }
    matches
        .iter()
        .map(|e| {
            format!(
                "✅ 식약처 인증 제품: {} (업소명: {})",
                e.product_name, e.company_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text report returned by the page-text tool
pub fn format_extract_report(result: &ScrapeResult) -> String {
    let certification = if result.certification_matches.is_empty() {
        "❌ 텍스트 내에 식약처 인증 제품명이 포함되어 있지 않습니다.".to_string()
    } else {
        let lines: Vec<String> = result
            .certification_matches
            .iter()
            .map(|e| format!("- {} (업소명: {})", e.product_name, e.company_name))
            .collect();
        format!("다음과 같은 제품이 등록되어 있습니다:\n{}", lines.join("\n"))
    };

    format!(
        "[텍스트 추출 결과]\n{}\n\n[식약처 인증 제품 검사]\n{}",
        result.page_text, certification
    )
}

/// File name for a download: the supplied name's last component, else the
/// URL's last path segment without query
pub fn target_file_name(url: &str, save_path: Option<&str>) -> String {
    if let Some(name) = save_path
        .and_then(|p| Path::new(p).file_name())
        .and_then(|n| n.to_str())
    {
        return name.to_string();
    }

    let last = url.rsplit('/').next().unwrap_or_default();
    let name = last.split(['?', '#']).next().unwrap_or_default();
    if name.is_empty() {
        DEFAULT_IMAGE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Upload MIME type from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// JSON field rendered the way a loosely typed client prints it
pub fn display_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn remote_detail(e: &Error) -> String {
    match e {
        Error::RemoteCall(detail) => detail.clone(),
        other => other.to_string(),
    }
}

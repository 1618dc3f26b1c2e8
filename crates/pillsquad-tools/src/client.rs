//! Client for the remote prediction API

use crate::config::ApiEndpoints;
use pillsquad_core::{CompanyRequest, Error, IngredientRequest, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Raw reply of the prediction API; non-2xx replies are data, not errors
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::remote_call(format!("unexpected response body: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
}

impl PredictionClient {
    pub fn new(endpoints: ApiEndpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(http: reqwest::Client, endpoints: ApiEndpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn base_url(&self) -> &str {
        &self.endpoints.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Company-origin prediction
    pub async fn predict_company(&self, request: &CompanyRequest) -> Result<ApiResponse> {
        let url = self.url(&self.endpoints.company_endpoint);
        debug!(%url, "requesting company prediction");

        let response = self
            .http
            .post(&url)
            .json(request)
            .timeout(Duration::from_secs(self.endpoints.company_timeout_secs))
            .send()
            .await;
        Self::collect(response).await
    }

    /// Ingredient / company-name risk prediction
    pub async fn predict_ingredients(&self, request: &IngredientRequest) -> Result<ApiResponse> {
        let url = self.url(&self.endpoints.ingredient_endpoint);
        debug!(%url, "requesting ingredient prediction");

        let response = self
            .http
            .post(&url)
            .json(request)
            .timeout(Duration::from_secs(self.endpoints.company_timeout_secs))
            .send()
            .await;
        Self::collect(response).await
    }

    /// Upload image bytes as the multipart `file` field
    pub async fn classify_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<ApiResponse> {
        let url = self.url(&self.endpoints.image_endpoint);
        debug!(%url, size = bytes.len(), file_name, mime, "uploading image");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| Error::invalid_input(format!("invalid MIME type {mime}: {e}")))?;

        let response = self
            .http
            .post(&url)
            .multipart(Form::new().part("file", part))
            .timeout(Duration::from_secs(self.endpoints.image_timeout_secs))
            .send()
            .await;
        Self::collect(response).await
    }

    async fn collect(
        response: std::result::Result<reqwest::Response, reqwest::Error>,
    ) -> Result<ApiResponse> {
        let response = response.map_err(|e| Error::remote_call(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::remote_call(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = PredictionClient::new(ApiEndpoints {
            base_url: "http://api:8000/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.url("/predict-company"),
            "http://api:8000/predict-company"
        );
        assert_eq!(client.url("classify-image"), "http://api:8000/classify-image");
    }

    #[test]
    fn test_response_status() {
        let ok = ApiResponse {
            status: StatusCode::OK,
            body: r#"{"result":"Yes"}"#.to_string(),
        };
        assert!(ok.is_ok());
        let value: serde_json::Value = ok.json().unwrap();
        assert_eq!(value["result"], "Yes");

        let created = ApiResponse {
            status: StatusCode::CREATED,
            body: String::new(),
        };
        assert!(!created.is_ok());
    }
}

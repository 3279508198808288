//! # Backend Client / 后端客户端
//!
//! Thin JSON-over-HTTP client for the analysis backend. Every call returns
//! the typed response or an [`ApiError`] carrying the raw body, so callers can
//! show it inline.
//!
//! 分析后端的 JSON HTTP 客户端。失败时返回携带原始响应体的 [`ApiError`]。

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::core::billing::{
    AnalyzeRequest, BillingResponse, FeedbackRequest, FeedbackResponse, TestExampleRequest,
    TestExampleResponse,
};
use crate::core::models::{ExampleId, Language};
use crate::core::runner::ExampleTester;
use crate::error::{ApiError, ApiResult};

pub const ANALYZE_PATH: &str = "/api/analyze-billing";
pub const TEST_EXAMPLE_PATH: &str = "/api/test-example";
pub const FEEDBACK_PATH: &str = "/api/feedback";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts `body` as JSON and returns the response text. Non-2xx statuses
    /// are [`ApiError::Status`].
    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!("POST {} answered with {}", url, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn post_decode<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.post_json(path, body).await?;
        serde_json::from_str(&raw).map_err(|source| ApiError::Decode { raw, source })
    }

    /// `POST /api/analyze-billing` with the structure check applied.
    pub async fn analyze_billing(&self, request: &AnalyzeRequest) -> ApiResult<BillingResponse> {
        let raw = self.post_json(ANALYZE_PATH, request).await?;
        BillingResponse::from_json(&raw)
    }

    pub async fn run_test_example(
        &self,
        request: &TestExampleRequest,
    ) -> ApiResult<TestExampleResponse> {
        self.post_decode(TEST_EXAMPLE_PATH, request).await
    }

    pub async fn send_feedback(&self, request: &FeedbackRequest) -> ApiResult<FeedbackResponse> {
        self.post_decode(FEEDBACK_PATH, request).await
    }
}

#[async_trait]
impl ExampleTester for BackendClient {
    async fn test_example(
        &self,
        id: &ExampleId,
        lang: Language,
    ) -> ApiResult<TestExampleResponse> {
        self.run_test_example(&TestExampleRequest::new(id, lang))
            .await
    }
}

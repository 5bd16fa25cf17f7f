//! HTTP implementation of the unit service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use examdesk_core::service::{
    ApiEnvelope, UnitCoverage, UnitSearchPage, UnitSearchQuery, UnitService, UnitStatistics,
};
use examdesk_core::{ApiError, UnitTreeNode};

use crate::abort::AbortSignal;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Unit service client over the backend REST API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct UnitApiClient {
    base_url: Url,
    api_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
    abort: Option<AbortSignal>,
}

impl UnitApiClient {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let base_url = Url::parse(base)
            .map_err(|e| ApiError::Transport(format!("invalid base url '{base}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "base url '{base}' cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_token,
            timeout_secs,
            client,
            abort: None,
        })
    }

    /// A client whose requests give up as soon as `signal` fires.
    pub fn with_abort_signal(&self, signal: AbortSignal) -> Self {
        Self {
            abort: Some(signal),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    /// GET `url`, unwrap the envelope, and log any failure before returning it.
    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, ApiError> {
        debug!(operation, url = %url, "unit service request");

        let exchange = self.exchange::<T>(url);
        let result = match &self.abort {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.aborted() => Err(ApiError::Aborted),
                    res = exchange => res,
                }
            }
            None => exchange.await,
        };

        if let Err(e) = &result {
            error!(operation, error = %e, "unit service request failed");
        }
        result
    }

    async fn exchange<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Envelope(format!("failed to parse response: {e}")))?;
        envelope.into_data()
    }

    fn classify(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ApiError::Transport(format!(
                "unit service not reachable at {}: {e}",
                self.base_url
            ))
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Prefer the envelope's `message` when an error body carries one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|env| env.message)
        .unwrap_or_else(|| body.to_string())
}

fn questions_query(include_questions: bool) -> Vec<(&'static str, String)> {
    if include_questions {
        vec![("includeQuestions", "true".to_string())]
    } else {
        Vec::new()
    }
}

#[async_trait]
impl UnitService for UnitApiClient {
    #[instrument(skip(self))]
    async fn units(&self, include_questions: bool) -> Result<Vec<UnitTreeNode>, ApiError> {
        let url = self.endpoint(&["api", "units"], &questions_query(include_questions));
        self.get("units", url).await
    }

    #[instrument(skip(self))]
    async fn units_by_grade(
        &self,
        grade: u32,
        include_questions: bool,
    ) -> Result<Vec<UnitTreeNode>, ApiError> {
        let grade = grade.to_string();
        let url = self.endpoint(
            &["api", "units", "grade", &grade],
            &questions_query(include_questions),
        );
        self.get("units_by_grade", url).await
    }

    #[instrument(skip(self, query), fields(keyword = ?query.keyword, subject = ?query.subject, grade = ?query.grade))]
    async fn search_units(&self, query: &UnitSearchQuery) -> Result<UnitSearchPage, ApiError> {
        let url = self.endpoint(&["api", "units", "search"], &query.to_pairs());
        self.get("search_units", url).await
    }

    #[instrument(skip(self))]
    async fn unit_coverage(&self, exam_sheet_id: &str) -> Result<UnitCoverage, ApiError> {
        let url = self.endpoint(&["api", "exam-sheets", exam_sheet_id, "unit-coverage"], &[]);
        self.get("unit_coverage", url).await
    }

    #[instrument(skip(self))]
    async fn unit_statistics(&self, unit_id: &str) -> Result<UnitStatistics, ApiError> {
        let url = self.endpoint(&["api", "units", unit_id, "statistics"], &[]);
        self.get("unit_statistics", url).await
    }

    #[instrument(skip(self))]
    async fn all_unit_statistics(&self) -> Result<Vec<UnitStatistics>, ApiError> {
        let url = self.endpoint(&["api", "units", "statistics"], &[]);
        self.get("all_unit_statistics", url).await
    }
}

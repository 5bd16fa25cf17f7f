//! Remote unit service contract.
//!
//! [`UnitService`] is implemented by `examdesk-client` over HTTP and by an
//! in-memory mock. The coverage and statistics payloads are computed by the
//! server; this side only carries them to the display layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::UnitTreeNode;

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// Trait for backends that serve the curriculum unit tree.
#[async_trait]
pub trait UnitService: Send + Sync {
    /// Full forest of root units.
    async fn units(&self, include_questions: bool) -> Result<Vec<UnitTreeNode>, ApiError>;

    /// Forest scoped to a single grade.
    async fn units_by_grade(
        &self,
        grade: u32,
        include_questions: bool,
    ) -> Result<Vec<UnitTreeNode>, ApiError>;

    /// Paginated keyword search.
    async fn search_units(&self, query: &UnitSearchQuery) -> Result<UnitSearchPage, ApiError>;

    /// Coverage analysis for one exam sheet.
    async fn unit_coverage(&self, exam_sheet_id: &str) -> Result<UnitCoverage, ApiError>;

    /// Question statistics for one unit.
    async fn unit_statistics(&self, unit_id: &str) -> Result<UnitStatistics, ApiError>;

    /// Question statistics for every unit.
    async fn all_unit_statistics(&self) -> Result<Vec<UnitStatistics>, ApiError>;
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Parameters for [`UnitService::search_units`]. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSearchQuery {
    pub keyword: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl UnitSearchQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        if let Some(subject) = &self.subject {
            pairs.push(("subject", subject.clone()));
        }
        if let Some(grade) = self.grade {
            pairs.push(("grade", grade.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSearchPage {
    #[serde(default)]
    pub units: Vec<UnitTreeNode>,
    /// Total matches across all pages.
    #[serde(default)]
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Coverage & statistics (server-computed)
// ---------------------------------------------------------------------------

/// A labelled bucket in a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub label: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// A unit the exam sheet does not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingUnit {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// How an exam sheet's questions spread over the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCoverage {
    pub exam_sheet_id: String,
    #[serde(default)]
    pub total_questions: u64,
    #[serde(default)]
    pub covered_units: u64,
    #[serde(default)]
    pub subject_distribution: Vec<DistributionEntry>,
    #[serde(default)]
    pub grade_distribution: Vec<DistributionEntry>,
    #[serde(default)]
    pub missing_units: Vec<MissingUnit>,
}

/// Frequency and difficulty figures for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatistics {
    pub unit_id: String,
    #[serde(default)]
    pub unit_name: String,
    #[serde(default)]
    pub question_count: u64,
    /// Number of exam sheets that used this unit.
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub average_difficulty: Option<f64>,
    #[serde(default)]
    pub difficulty_distribution: Vec<DistributionEntry>,
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Standard wrapper around every backend response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Wrap a payload as a successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Extract the payload, rejecting failed or empty envelopes.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Envelope(
                self.message
                    .unwrap_or_else(|| "request reported failure".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ApiError::Envelope("envelope has no data".to_string()))
    }
}

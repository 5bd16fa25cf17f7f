//! In-memory unit service for offline use and testing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use examdesk_core::service::{
    UnitCoverage, UnitSearchPage, UnitSearchQuery, UnitService, UnitStatistics,
};
use examdesk_core::tree::{filter_unit_tree_nodes, subject_subtrees, UnitFilter};
use examdesk_core::{ApiError, UnitTreeNode};

/// A unit service answering from a forest held in memory.
///
/// Grade scoping and search are computed locally with the same tree
/// utilities the UI uses.
#[derive(Debug, Default)]
pub struct MockUnitService {
    forest: Vec<UnitTreeNode>,
    coverages: HashMap<String, UnitCoverage>,
    statistics: Vec<UnitStatistics>,
    /// Error returned by the next call, if primed.
    next_failure: Mutex<Option<ApiError>>,
    call_count: AtomicU32,
}

/// On-disk shape accepted by [`MockUnitService::from_json_file`]: either a
/// bare forest or a forest with canned coverage and statistics.
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Forest(Vec<UnitTreeNode>),
    Full {
        units: Vec<UnitTreeNode>,
        #[serde(default)]
        coverages: Vec<UnitCoverage>,
        #[serde(default)]
        statistics: Vec<UnitStatistics>,
    },
}

impl MockUnitService {
    pub fn new(forest: Vec<UnitTreeNode>) -> Self {
        Self {
            forest,
            ..Default::default()
        }
    }

    /// Load a fixture file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read unit file: {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse unit file: {}", path.display()))?;

        Ok(match fixture {
            Fixture::Forest(forest) => Self::new(forest),
            Fixture::Full {
                units,
                coverages,
                statistics,
            } => coverages
                .into_iter()
                .fold(Self::new(units), |svc, c| svc.with_coverage(c))
                .with_statistics(statistics),
        })
    }

    pub fn with_coverage(mut self, coverage: UnitCoverage) -> Self {
        self.coverages
            .insert(coverage.exam_sheet_id.clone(), coverage);
        self
    }

    pub fn with_statistics(mut self, statistics: Vec<UnitStatistics>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        *self.next_failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }

    /// Get the number of calls made to this service.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn begin_call(&self) -> Result<(), ApiError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match self
            .next_failure
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Keep structural nodes without a grade and nodes of `grade`, recursively.
fn scope_to_grade(nodes: &[UnitTreeNode], grade: u32) -> Vec<UnitTreeNode> {
    nodes
        .iter()
        .filter(|n| n.grade.map_or(true, |g| g == grade))
        .map(|n| UnitTreeNode {
            children: scope_to_grade(&n.children, grade),
            ..n.clone()
        })
        .collect()
}

fn strip_questions(nodes: &mut [UnitTreeNode]) {
    for node in nodes {
        node.questions.clear();
        strip_questions(&mut node.children);
    }
}

fn shaped(mut forest: Vec<UnitTreeNode>, include_questions: bool) -> Vec<UnitTreeNode> {
    if !include_questions {
        strip_questions(&mut forest);
    }
    forest
}

#[async_trait]
impl UnitService for MockUnitService {
    async fn units(&self, include_questions: bool) -> Result<Vec<UnitTreeNode>, ApiError> {
        self.begin_call()?;
        Ok(shaped(self.forest.clone(), include_questions))
    }

    async fn units_by_grade(
        &self,
        grade: u32,
        include_questions: bool,
    ) -> Result<Vec<UnitTreeNode>, ApiError> {
        self.begin_call()?;
        Ok(shaped(scope_to_grade(&self.forest, grade), include_questions))
    }

    async fn search_units(&self, query: &UnitSearchQuery) -> Result<UnitSearchPage, ApiError> {
        self.begin_call()?;

        let scoped;
        let forest = match &query.subject {
            Some(subject) => {
                scoped = subject_subtrees(&self.forest, subject);
                scoped.as_slice()
            }
            None => self.forest.as_slice(),
        };

        let filter = UnitFilter {
            grade: query.grade,
            unit_type: None,
            search_term: query.keyword.clone(),
        };
        let matches = filter_unit_tree_nodes(forest, &filter);

        let total = matches.len() as u64;
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let units = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(UnitSearchPage { units, total })
    }

    async fn unit_coverage(&self, exam_sheet_id: &str) -> Result<UnitCoverage, ApiError> {
        self.begin_call()?;
        self.coverages
            .get(exam_sheet_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("exam sheet not found: {exam_sheet_id}"),
            })
    }

    async fn unit_statistics(&self, unit_id: &str) -> Result<UnitStatistics, ApiError> {
        self.begin_call()?;
        self.statistics
            .iter()
            .find(|s| s.unit_id == unit_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("unit not found: {unit_id}"),
            })
    }

    async fn all_unit_statistics(&self) -> Result<Vec<UnitStatistics>, ApiError> {
        self.begin_call()?;
        Ok(self.statistics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examdesk_core::UnitType;
    use serde_json::json;

    fn forest() -> Vec<UnitTreeNode> {
        let mut m1 = UnitTreeNode::new("m1", "일차함수", UnitType::Unit).with_grade(1);
        m1.questions = vec![json!({"id": "q1"})];
        vec![
            UnitTreeNode::new("math", "수학", UnitType::Subject).with_children(vec![
                m1,
                UnitTreeNode::new("m2", "이차함수", UnitType::Unit).with_grade(2),
                UnitTreeNode::new("m3", "도형", UnitType::Unit).with_grade(2),
            ]),
            UnitTreeNode::new("sci", "과학", UnitType::Subject).with_children(vec![
                UnitTreeNode::new("s1", "함수와 운동", UnitType::Unit).with_grade(2),
            ]),
        ]
    }

    #[tokio::test]
    async fn strips_questions_unless_requested() {
        let svc = MockUnitService::new(forest());
        let bare = svc.units(false).await.unwrap();
        assert!(bare[0].children[0].questions.is_empty());
        let full = svc.units(true).await.unwrap();
        assert_eq!(full[0].children[0].questions.len(), 1);
        assert_eq!(svc.call_count(), 2);
    }

    #[tokio::test]
    async fn grade_scope_keeps_structure() {
        let svc = MockUnitService::new(forest());
        let grade2 = svc.units_by_grade(2, false).await.unwrap();
        assert_eq!(grade2.len(), 2);
        let math_ids: Vec<_> = grade2[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(math_ids, vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn search_pages_and_scopes_by_subject() {
        let svc = MockUnitService::new(forest());

        let page = svc
            .search_units(&UnitSearchQuery {
                limit: Some(1),
                offset: Some(1),
                ..UnitSearchQuery::keyword("함수")
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.units.len(), 1);
        assert_eq!(page.units[0].id, "m2");

        let math_only = svc
            .search_units(&UnitSearchQuery {
                subject: Some("수학".into()),
                ..UnitSearchQuery::keyword("함수")
            })
            .await
            .unwrap();
        assert_eq!(math_only.total, 2);
    }

    #[tokio::test]
    async fn primed_failure_hits_once() {
        let svc = MockUnitService::new(forest());
        svc.fail_next(ApiError::Timeout(30));
        assert_eq!(svc.units(false).await.unwrap_err(), ApiError::Timeout(30));
        assert!(svc.units(false).await.is_ok());
    }

    #[tokio::test]
    async fn missing_coverage_is_not_found() {
        let svc = MockUnitService::new(forest());
        let err = svc.unit_coverage("sheet-x").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn loads_full_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        std::fs::write(
            &path,
            json!({
                "units": [{"id": "math", "name": "수학", "type": "SUBJECT"}],
                "coverages": [{"examSheetId": "sheet-1", "totalQuestions": 10}],
                "statistics": [{"unitId": "math", "questionCount": 4}]
            })
            .to_string(),
        )
        .unwrap();

        let svc = MockUnitService::from_json_file(&path).unwrap();
        assert_eq!(svc.units(false).await.unwrap().len(), 1);
        assert_eq!(svc.unit_coverage("sheet-1").await.unwrap().total_questions, 10);
        assert_eq!(svc.unit_statistics("math").await.unwrap().question_count, 4);
    }

    #[tokio::test]
    async fn loads_bare_forest_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(
            &path,
            r#"[{"id": "math", "name": "수학", "type": "SUBJECT", "children": []}]"#,
        )
        .unwrap();

        let svc = MockUnitService::from_json_file(&path).unwrap();
        assert!(svc.all_unit_statistics().await.unwrap().is_empty());
        assert_eq!(svc.units(false).await.unwrap()[0].id, "math");
    }
}

//! Session state shared by the handlers of one signed-in user.
//!
//! A [`SessionStore`] is created once per application session and passed to
//! whatever needs it. Every write notifies subscribers; [`SessionStore::logout`]
//! resets all state back to its defaults.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Teacher,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// A single answer in an exam submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Answer {
    /// Chosen option number for a multiple-choice question.
    Objective(u32),
    /// Free-text answer.
    Subjective(String),
}

/// Answers recorded so far for the exam sheet being taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub exam_sheet_id: Option<String>,
    /// Answers keyed by question id.
    pub answers: BTreeMap<String, Answer>,
}

/// Everything the store holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<SessionUser>,
    /// Display labels set by one screen and read by another.
    pub labels: HashMap<String, String>,
    pub draft: SubmissionDraft,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Observable store for [`Session`].
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every subsequent write.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn login(&self, user: SessionUser) {
        info!(user_id = %user.id, role = ?user.role, "session started");
        self.tx.send_modify(|s| s.user = Some(user));
    }

    pub fn set_label(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.tx.send_modify(|s| {
            s.labels.insert(key, value);
        });
    }

    /// Record an answer, starting a new draft if the exam sheet changed.
    pub fn record_answer(&self, exam_sheet_id: &str, question_id: &str, answer: Answer) {
        debug!(exam_sheet_id, question_id, "recording answer");
        self.tx.send_modify(|s| {
            if s.draft.exam_sheet_id.as_deref() != Some(exam_sheet_id) {
                s.draft = SubmissionDraft {
                    exam_sheet_id: Some(exam_sheet_id.to_string()),
                    answers: BTreeMap::new(),
                };
            }
            s.draft.answers.insert(question_id.to_string(), answer);
        });
    }

    /// Take the current draft, leaving an empty one behind.
    pub fn take_draft(&self) -> SubmissionDraft {
        let mut taken = SubmissionDraft::default();
        self.tx.send_modify(|s| taken = std::mem::take(&mut s.draft));
        taken
    }

    pub fn clear_draft(&self) {
        self.tx.send_modify(|s| s.draft = SubmissionDraft::default());
    }

    /// Drop the user, labels, and draft in one step.
    pub fn logout(&self) {
        let user_id = self.tx.borrow().user.as_ref().map(|u| u.id.clone());
        info!(user_id = ?user_id, "session reset on logout");
        self.tx.send_replace(Session::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> SessionUser {
        SessionUser {
            id: "s-100".into(),
            name: "김학생".into(),
            role: Role::Student,
        }
    }

    #[test]
    fn login_and_labels() {
        let store = SessionStore::new();
        assert!(!store.snapshot().is_authenticated());

        store.login(student());
        store.set_label("examTitle", "1학기 중간고사");

        let session = store.snapshot();
        assert_eq!(session.user.unwrap().role, Role::Student);
        assert_eq!(session.labels["examTitle"], "1학기 중간고사");
    }

    #[test]
    fn draft_restarts_for_new_sheet() {
        let store = SessionStore::new();
        store.record_answer("sheet-1", "q1", Answer::Objective(3));
        store.record_answer("sheet-1", "q2", Answer::Subjective("x = 2".into()));
        assert_eq!(store.snapshot().draft.answers.len(), 2);

        store.record_answer("sheet-2", "q1", Answer::Objective(1));
        let draft = store.snapshot().draft;
        assert_eq!(draft.exam_sheet_id.as_deref(), Some("sheet-2"));
        assert_eq!(draft.answers.len(), 1);
    }

    #[test]
    fn take_draft_empties_store() {
        let store = SessionStore::new();
        store.record_answer("sheet-1", "q1", Answer::Objective(2));
        let draft = store.take_draft();
        assert_eq!(draft.answers["q1"], Answer::Objective(2));
        assert_eq!(store.snapshot().draft, SubmissionDraft::default());
    }

    #[test]
    fn logout_resets_everything() {
        let store = SessionStore::new();
        store.login(student());
        store.set_label("unit", "대수");
        store.record_answer("sheet-1", "q1", Answer::Objective(4));

        store.logout();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn subscribers_see_writes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.login(student());
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn answer_wire_format() {
        let json = serde_json::to_value(Answer::Objective(2)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "OBJECTIVE", "value": 2}));
    }
}

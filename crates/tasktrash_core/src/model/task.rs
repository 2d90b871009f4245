use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Set only while the task sits in the trash.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub deleted_at: Option<OffsetDateTime>,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            text: text.into(),
            created_at,
            deleted_at: None,
        }
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) fn mark_deleted(&mut self, at: OffsetDateTime) {
        self.deleted_at = Some(at);
    }

    pub(crate) fn clear_deleted(&mut self) {
        self.deleted_at = None;
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Immutable record of one completed attempt. Created once at submit time,
/// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub student_id: Uuid,
    pub assessment_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub responses: JsonValue,
    pub completed_at: DateTime<Utc>,
}

impl Submission {
    /// question id -> chosen option id; malformed JSON degrades to empty.
    pub fn response_map(&self) -> BTreeMap<String, String> {
        serde_json::from_value(self.responses.clone()).unwrap_or_default()
    }
}

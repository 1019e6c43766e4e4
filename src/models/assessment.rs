use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

pub const TYPE_PRACTICE: &str = "PRACTICE";
pub const TYPE_TEST: &str = "TEST";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub title: String,
    pub assessment_type: String,
    pub subject: Option<String>,
    pub questions: JsonValue,
    pub duration_minutes: Option<i32>,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Assessment {
    pub fn is_practice(&self) -> bool {
        self.assessment_type == TYPE_PRACTICE
    }

    /// The stored question array, tolerating malformed rows (empty set).
    pub fn parsed_questions(&self) -> Vec<super::question::Question> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }
}

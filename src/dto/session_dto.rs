use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    pub assessment_id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
    #[validate(length(min = 1))]
    pub option_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: uuid::Uuid,
    pub assessment_id: uuid::Uuid,
    pub status: String,
    pub question_index: i32,
    pub review_index: i32,
    pub total_questions: usize,
    pub mistake_count: usize,
    pub responses: serde_json::Value,
    pub revealed: serde_json::Value,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub submission_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub submission_id: uuid::Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub accuracy_percent: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

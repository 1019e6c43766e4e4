use crate::models::question::McqOption;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewQuestion {
    pub question_id: String,
    pub text: String,
    pub options: Vec<McqOption>,
    pub selected_option_id: Option<String>,
    pub correct_option_id: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReviewResponse {
    pub submission_id: uuid::Uuid,
    pub assessment_id: uuid::Uuid,
    pub assessment_title: String,
    pub score: i32,
    pub total_questions: i32,
    pub accuracy_percent: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<ReviewQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentStats {
    pub student_id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub submissions_count: i64,
    pub average_accuracy_percent: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExplainRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub question_id: String,
    pub explanation: String,
}

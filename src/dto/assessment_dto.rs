use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssessmentPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// "PRACTICE" or "TEST".
    pub assessment_type: String,
    pub subject: Option<String>,
    pub duration_minutes: Option<i32>,
    pub questions: Vec<Question>,
}

/// Candidate assessment produced by the AI bridge. Never persisted directly:
/// the teacher confirms it through the regular create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftAssessment {
    pub title: String,
    pub assessment_type: String,
    pub subject: Option<String>,
    pub duration_minutes: Option<i32>,
    pub questions: Vec<Question>,
}

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::review_dto::{
    ExplainRequest, ExplainResponse, ReviewQuestion, SubmissionReviewResponse,
};
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::models::submission::Submission;
use crate::models::user::ROLE_TEACHER;
use crate::services::scoring_service::ScoringService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub student_id: Option<Uuid>,
}

fn is_teacher(claims: &Claims) -> bool {
    claims
        .role
        .as_deref()
        .map(|r| r.eq_ignore_ascii_case(ROLE_TEACHER))
        .unwrap_or(false)
}

/// Students may only read their own submissions; teachers may read any.
fn check_access(claims: &Claims, submission: &Submission) -> crate::error::Result<()> {
    if is_teacher(claims) || submission.student_id == claims.user_id()? {
        return Ok(());
    }
    Err(Error::NotFound("Resource not found".to_string()))
}

#[axum::debug_handler]
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListSubmissionsQuery>,
) -> crate::error::Result<Response> {
    // Teachers may scope the list to one student; students always get their own.
    let student_id = if is_teacher(&claims) {
        query.student_id
    } else {
        Some(claims.user_id()?)
    };
    let submissions = state.submission_service.list(student_id).await?;
    Ok(Json(submissions).into_response())
}

#[axum::debug_handler]
pub async fn review_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let submission = state.submission_service.get_by_id(id).await?;
    check_access(&claims, &submission)?;

    let assessment = state
        .assessment_service
        .get_by_id(submission.assessment_id)
        .await?;
    let questions = assessment.parsed_questions();
    let responses = submission.response_map();
    let results = ScoringService::review(&questions, &responses);

    let review_questions = questions
        .iter()
        .zip(results)
        .map(|(q, r)| ReviewQuestion {
            question_id: r.question_id,
            text: q.text.clone(),
            options: q.options.clone(),
            selected_option_id: r.selected_option_id,
            correct_option_id: r.correct_option_id,
            is_correct: r.is_correct,
            explanation: q.explanation.clone(),
            image_url: q.image_url.clone(),
        })
        .collect();

    let resp = SubmissionReviewResponse {
        submission_id: submission.id,
        assessment_id: assessment.id,
        assessment_title: assessment.title.clone(),
        score: submission.score,
        total_questions: submission.total_questions,
        accuracy_percent: ScoringService::accuracy_percent(
            submission.score,
            submission.total_questions,
        ),
        completed_at: submission.completed_at,
        questions: review_questions,
    };
    Ok(Json(resp).into_response())
}

#[axum::debug_handler]
pub async fn explain_mistake(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExplainRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let submission = state.submission_service.get_by_id(id).await?;
    check_access(&claims, &submission)?;

    let assessment = state
        .assessment_service
        .get_by_id(submission.assessment_id)
        .await?;
    let questions = assessment.parsed_questions();
    let question = questions
        .iter()
        .find(|q| q.id == req.question_id)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "question '{}' is not part of this submission",
                req.question_id
            ))
        })?;

    let responses = submission.response_map();
    let chosen = responses.get(&question.id).map(|s| s.as_str());
    let explanation = state.ai_service.explain_mistake(question, chosen).await;

    Ok(Json(ExplainResponse {
        question_id: req.question_id,
        explanation,
    })
    .into_response())
}

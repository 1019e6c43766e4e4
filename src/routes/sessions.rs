use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{AnswerRequest, SessionView, StartSessionRequest, SubmitResponse};
use crate::middleware::auth::Claims;
use crate::models::assessment::Assessment;
use crate::models::session::{AttemptSession, STATUS_IN_PROGRESS};
use crate::services::scoring_service::ScoringService;
use crate::AppState;

fn view(session: AttemptSession, assessment: &Assessment) -> SessionView {
    let questions = assessment.parsed_questions();
    let state = session.state();
    // Mistakes are only surfaced once the attempt is over.
    let mistake_count = if state.status == STATUS_IN_PROGRESS {
        0
    } else {
        state.mistakes(&questions).len()
    };
    SessionView {
        id: session.id,
        assessment_id: session.assessment_id,
        status: session.status,
        question_index: session.question_index,
        review_index: session.review_index,
        total_questions: questions.len(),
        mistake_count,
        responses: session.responses,
        revealed: session.revealed,
        deadline: session.deadline,
        submission_id: session.submission_id,
    }
}

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartSessionRequest>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state
        .session_service
        .start(student_id, req.assessment_id)
        .await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok((StatusCode::CREATED, Json(view(session, &assessment))).into_response())
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let (session, assessment) = state.session_service.load(id, Some(student_id)).await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let student_id = claims.user_id()?;
    let session = state
        .session_service
        .answer(id, student_id, &req.question_id, &req.option_id)
        .await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn advance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.advance(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn back(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.back(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn reveal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.reveal(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let (_session, submission) = state
        .session_service
        .submit(id, student_id, &state.submission_service)
        .await?;
    let resp = SubmitResponse {
        submission_id: submission.id,
        score: submission.score,
        total_questions: submission.total_questions,
        accuracy_percent: ScoringService::accuracy_percent(
            submission.score,
            submission.total_questions,
        ),
        completed_at: submission.completed_at,
    };
    Ok(Json(resp).into_response())
}

#[axum::debug_handler]
pub async fn start_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.start_review(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn review_advance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.review_advance(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

#[axum::debug_handler]
pub async fn review_back(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let student_id = claims.user_id()?;
    let session = state.session_service.review_back(id, student_id).await?;
    let assessment = state
        .assessment_service
        .get_by_id(session.assessment_id)
        .await?;
    Ok(Json(view(session, &assessment)).into_response())
}

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::assessment_dto::CreateAssessmentPayload;
use crate::middleware::auth::Claims;
use crate::models::assessment::TYPE_PRACTICE;
use crate::services::ai_service::GenerationRequest;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_assessments(State(state): State<AppState>) -> crate::error::Result<Response> {
    let assessments = state.assessment_service.list().await?;
    Ok(Json(assessments).into_response())
}

#[axum::debug_handler]
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let assessment = state.assessment_service.get_by_id(id).await?;
    Ok(Json(assessment).into_response())
}

#[axum::debug_handler]
pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAssessmentPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let created_by = claims.user_id()?;
    let assessment = state.assessment_service.create(payload, created_by).await?;
    Ok((StatusCode::CREATED, Json(assessment)).into_response())
}

#[axum::debug_handler]
pub async fn upsert_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAssessmentPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let created_by = claims.user_id()?;
    let assessment = state
        .assessment_service
        .upsert(id, payload, created_by)
        .await?;
    Ok(Json(assessment).into_response())
}

/// Draft an assessment from an uploaded document. The draft is returned for
/// review; persisting it is a separate, explicit create/upsert call.
#[axum::debug_handler]
pub async fn generate_assessment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    let mut filename = String::new();
    let mut document: Option<bytes::Bytes> = None;
    let mut subject: Option<String> = None;
    let mut assessment_type = TYPE_PRACTICE.to_string();
    let mut instructions: Option<String> = None;
    let mut num_questions: usize = 5;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(crate::error::Error::Multipart)?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().unwrap_or("document.txt").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(crate::error::Error::Multipart)?;
                if !data.is_empty() {
                    document = Some(data);
                }
            }
            "subject" => {
                let text = field.text().await.map_err(crate::error::Error::Multipart)?;
                if !text.trim().is_empty() {
                    subject = Some(text.trim().to_string());
                }
            }
            "assessment_type" => {
                assessment_type = field
                    .text()
                    .await
                    .map_err(crate::error::Error::Multipart)?
                    .trim()
                    .to_string();
            }
            "instructions" => {
                let text = field.text().await.map_err(crate::error::Error::Multipart)?;
                if !text.trim().is_empty() {
                    instructions = Some(text.trim().to_string());
                }
            }
            "num_questions" => {
                let text = field.text().await.map_err(crate::error::Error::Multipart)?;
                num_questions = text.trim().parse().map_err(|_| {
                    crate::error::Error::BadRequest("num_questions must be a number".to_string())
                })?;
            }
            _ => {}
        }
    }

    let Some(document) = document else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "empty_document",
                "message": "Please upload a document to generate from"
            })),
        )
            .into_response());
    };

    let draft = state
        .ai_service
        .generate_assessment(GenerationRequest {
            filename,
            document,
            subject,
            assessment_type,
            instructions,
            num_questions,
        })
        .await?;

    Ok(Json(draft).into_response())
}

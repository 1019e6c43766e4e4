use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};

use crate::AppState;

/// Class roster, alphabetical.
#[axum::debug_handler]
pub async fn list_students(State(state): State<AppState>) -> crate::error::Result<Response> {
    let students = state.auth_service.list_students().await?;
    Ok(Json(students).into_response())
}

/// Teacher dashboard: every student with their attempt count and mean accuracy.
#[axum::debug_handler]
pub async fn list_student_stats(State(state): State<AppState>) -> crate::error::Result<Response> {
    let stats = state.submission_service.student_stats().await?;
    Ok(Json(stats).into_response())
}

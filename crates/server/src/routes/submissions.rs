use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use common::types::ApiResponse;
use service::submission::domain::SubmissionRecord;

use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct SubmitModuleBody {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub answers: serde_json::Value,
}

#[derive(Deserialize)]
pub struct SingleQuestionBody {
    pub question_id: String,
    #[serde(default)]
    pub answer: serde_json::Value,
}

/// POST /submissions/:id/submit — record the acting student's work for a
/// module. The owner comes from the token, never the body.
pub async fn submit_module(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(module_id): Path<String>,
    Json(body): Json<SubmitModuleBody>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionRecord>>), ApiError> {
    let rec = state
        .submissions
        .submit_module(user.id, &module_id, body.course_id, body.answers)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, "Submission recorded", rec)),
    ))
}

/// GET /submissions/student — everything the acting student has submitted.
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<SubmissionRecord>>>, ApiError> {
    let rows = state.submissions.list_by_student(user.id).await?;
    Ok(Json(ApiResponse::new(200, "Submissions fetched", rows)))
}

/// GET /submissions/:id — detail view, owner only.
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SubmissionRecord>>, ApiError> {
    let rec = state.submissions.get_by_id(user.id, id).await?;
    Ok(Json(ApiResponse::new(200, "Submission fetched", rec)))
}

/// GET /submissions/course/:course_id — course view, filtered to the acting
/// student.
pub async fn list_by_course(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(course_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SubmissionRecord>>>, ApiError> {
    let rows = state.submissions.list_by_course(user.id, &course_id).await?;
    Ok(Json(ApiResponse::new(200, "Submissions fetched", rows)))
}

/// POST /submissions/:id/singlequestion — anonymous practice answers. The
/// student id is a path parameter by design; no token, no ownership
/// guarantee.
pub async fn submit_single_question(
    State(state): State<ServerState>,
    Path(student_id): Path<Uuid>,
    Json(body): Json<SingleQuestionBody>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionRecord>>), ApiError> {
    let rec = state
        .submissions
        .submit_single_question(student_id, &body.question_id, body.answer)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, "Practice submission recorded", rec)),
    ))
}

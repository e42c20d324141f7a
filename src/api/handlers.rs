use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::auth::{AdminUser, AuthUser};
use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::database::{
    Assignment, AssignmentKind, AssignmentStatus, MonthlyCount, TestKind, TestRecord,
};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// --- test record handlers -------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: Value,
}

#[derive(Debug, Deserialize)]
pub struct SaveProgressRequest {
    pub id: Option<Uuid>,
    pub answers: Value,
}

fn require_answers_object(answers: &Value) -> ApiResult<()> {
    if answers.is_object() {
        Ok(())
    } else {
        Err(ApiError::Validation("answers must be a JSON object".to_string()))
    }
}

async fn submit_test(
    state: AppState,
    user: AuthUser,
    kind: TestKind,
    payload: SubmitRequest,
) -> ApiResult<(StatusCode, Json<TestRecord>)> {
    require_answers_object(&payload.answers)?;
    let record = state
        .service
        .submit_for_scoring(user.id, kind, payload.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn save_test_progress(
    state: AppState,
    user: AuthUser,
    kind: TestKind,
    payload: SaveProgressRequest,
) -> ApiResult<Json<TestRecord>> {
    require_answers_object(&payload.answers)?;
    let record = state
        .service
        .save_progress(user.id, kind, payload.id, payload.answers)
        .await?;
    Ok(Json(record))
}

pub async fn submit_simple_test(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<TestRecord>)> {
    submit_test(state, user, TestKind::Simple, payload).await
}

pub async fn submit_advanced_test(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<TestRecord>)> {
    submit_test(state, user, TestKind::Advanced, payload).await
}

pub async fn save_simple_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveProgressRequest>,
) -> ApiResult<Json<TestRecord>> {
    save_test_progress(state, user, TestKind::Simple, payload).await
}

pub async fn save_advanced_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveProgressRequest>,
) -> ApiResult<Json<TestRecord>> {
    save_test_progress(state, user, TestKind::Advanced, payload).await
}

pub async fn complete_test(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TestRecord>> {
    let record = state.service.complete(user.id, id).await?;
    Ok(Json(record))
}

pub async fn get_test(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TestRecord>> {
    let record = state.service.get(user.id, id).await?;
    Ok(Json(record))
}

pub async fn list_my_simple_tests(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<TestRecord>>> {
    Ok(Json(state.service.list_for_owner(user.id, TestKind::Simple).await?))
}

pub async fn list_my_advanced_tests(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<TestRecord>>> {
    Ok(Json(state.service.list_for_owner(user.id, TestKind::Advanced).await?))
}

pub async fn list_all_simple_tests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<TestRecord>>> {
    Ok(Json(state.service.list_all(TestKind::Simple).await?))
}

pub async fn list_all_advanced_tests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<TestRecord>>> {
    Ok(Json(state.service.list_all(TestKind::Advanced).await?))
}

pub async fn simple_monthly_counts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<MonthlyCount>>> {
    Ok(Json(state.service.monthly_counts(TestKind::Simple).await?))
}

pub async fn advanced_monthly_counts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<MonthlyCount>>> {
    Ok(Json(state.service.monthly_counts(TestKind::Advanced).await?))
}

pub async fn delete_test(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- chat handlers --------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

pub async fn chat(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let reply = state.openai.chat_response(&payload.message).await?;
    Ok(Json(ChatResponse { reply }))
}

pub async fn chat_title(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<TitleResponse>> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let title = state.openai.generate_title(&payload.message).await?;
    Ok(Json(TitleResponse { title }))
}

// --- assignment handlers --------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct AssignmentCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    pub client: Option<Uuid>,
    #[serde(default)]
    pub resources: Value,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentUpdate {
    pub name: Option<String>,
    pub status: Option<AssignmentStatus>,
    pub client: Option<Uuid>,
    pub resources: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub client: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListAssignmentsQuery {
    #[serde(rename = "type")]
    pub kind: Option<AssignmentKind>,
}

pub async fn create_assignment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<AssignmentCreate>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let assignment = Assignment::new(payload.name, payload.kind, payload.client, payload.resources);
    state.db.insert_assignment(&assignment).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    axum::extract::Query(query): axum::extract::Query<ListAssignmentsQuery>,
) -> ApiResult<Json<Vec<Assignment>>> {
    Ok(Json(state.db.list_assignments(query.kind).await?))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Assignment>> {
    let assignment = state
        .db
        .fetch_assignment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("assignment not found".to_string()))?;
    Ok(Json(assignment))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentUpdate>,
) -> ApiResult<Json<Assignment>> {
    let mut assignment = state
        .db
        .fetch_assignment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("assignment not found".to_string()))?;

    if let Some(name) = payload.name {
        if name.is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        assignment.name = name;
    }
    if let Some(status) = payload.status {
        assignment.status = status;
    }
    if let Some(client) = payload.client {
        assignment.client = Some(client);
    }
    if let Some(resources) = payload.resources {
        assignment.resources = resources;
    }

    state.db.update_assignment(&assignment).await?;
    Ok(Json(assignment))
}

pub async fn delete_assignment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_assignment(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("assignment not found".to_string()))
    }
}

/// Copies a template into a new assignment instance for a client.
pub async fn assign_template(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let template = state
        .db
        .fetch_assignment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("template not found".to_string()))?;

    if template.kind != AssignmentKind::Template {
        return Err(ApiError::Validation("only templates can be assigned".to_string()));
    }

    let instance = template.instantiate_for(payload.client);
    state.db.insert_assignment(&instance).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

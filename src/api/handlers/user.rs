use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json_body::JsonBody;
use crate::api::dtos::requests::{CreateUserRequest, DeleteUserRequest, GetUsersRequest, UpdateUserRequest};
use crate::api::dtos::responses::{MessageResponse, UpdateUsersResponse, UserCreatedResponse, UsersResponse};
use crate::domain::services::{
    reassignment::UpdateRequest,
    user_service::{DeleteKey, UserLookup},
};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.user_service.create_user(payload.into()).await?;

    Ok(Json(UserCreatedResponse {
        message: "User created successfully.".to_string(),
        user_id: created.user_id,
    }))
}

pub async fn get_users(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<GetUsersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lookup = UserLookup::try_from(payload)?;
    let users = state.user_service.get_users(lookup).await?;
    Ok(Json(UsersResponse { users }))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<DeleteUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = DeleteKey::try_from(payload)?;
    state.user_service.delete_user(key).await?;
    Ok(Json(MessageResponse { message: "User deleted successfully.".to_string() }))
}

/// 200 when every id succeeded, 207 with the itemised results otherwise.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = UpdateRequest::try_from(payload)?;
    let report = state.reassignment_engine.update_users(request).await?;

    let (status, message) = if report.all_succeeded() {
        (StatusCode::OK, "User(s) updated successfully.")
    } else {
        (StatusCode::MULTI_STATUS, "Some users could not be updated.")
    };
    info!(
        requested = report.outcomes.len(),
        succeeded = report.outcomes.iter().filter(|o| o.is_success()).count(),
        "update_user finished"
    );

    Ok((status, Json(UpdateUsersResponse { message: message.to_string(), results: report.outcomes })))
}

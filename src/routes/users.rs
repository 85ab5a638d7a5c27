use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::page_dto::PageQuery,
    dto::user_dto::{CreateUserPayload, UpdateUserPayload},
    error::Result,
    routes::parse_id,
    AppState,
};

const BAD_USER_ID: &str = "Неверный ID пользователя";

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "All users without password hashes"),
        (status = 403, description = "Caller is not an administrator")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list().await?;
    Ok(query.respond(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid payload, weak password, unknown position or duplicate")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Changed fields applied, or nothing to change"),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, BAD_USER_ID)?;
    let response = state.user_service.update(id, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, BAD_USER_ID)?;
    state.user_service.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Пользователь успешно удален",
    })))
}

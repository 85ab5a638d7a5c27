use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::auth_dto::MessageResponse,
    dto::external_connection_dto::{ExternalConnectionListQuery, ExternalConnectionPayload},
    error::Result,
    routes::parse_id,
    utils::time::now_naive,
    AppState,
};

const NOT_FOUND: &str = "Подключение не найдено";

#[utoipa::path(
    get,
    path = "/api/external-connections",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 10, at most 100")
    ),
    responses(
        (status = 200, description = "Current connections; expired ones are removed first")
    )
)]
#[axum::debug_handler]
pub async fn list_external_connections(
    State(state): State<AppState>,
    Query(query): Query<ExternalConnectionListQuery>,
) -> Result<impl IntoResponse> {
    let (page, limit) = query.page_and_limit();
    let result = state
        .external_connection_service
        .list(page, limit, now_naive())
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/external-connections/add",
    responses(
        (status = 201, description = "Connection added"),
        (status = 400, description = "Missing fields or unknown organization")
    )
)]
#[axum::debug_handler]
pub async fn add_external_connection(
    State(state): State<AppState>,
    Json(payload): Json<ExternalConnectionPayload>,
) -> Result<impl IntoResponse> {
    let new = payload.into_new()?;
    let created = state.external_connection_service.add(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/external-connections/{id}",
    params(("id" = i32, Path, description = "Connection ID")),
    responses(
        (status = 200, description = "Connection updated"),
        (status = 400, description = "Missing fields or unknown organization"),
        (status = 404, description = "Connection not found")
    )
)]
#[axum::debug_handler]
pub async fn update_external_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ExternalConnectionPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let new = payload.into_new()?;
    let updated = state.external_connection_service.update(id, new).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/external-connections/{id}",
    params(("id" = i32, Path, description = "Connection ID")),
    responses(
        (status = 200, description = "Connection deleted"),
        (status = 404, description = "Connection not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_external_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.external_connection_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Подключение удалено")))
}

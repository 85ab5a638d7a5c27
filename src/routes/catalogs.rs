use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    dto::catalog_dto::NamePayload,
    dto::page_dto::PageQuery,
    error::Result,
    routes::parse_id,
    services::catalog_service::CatalogService,
    AppState,
};

async fn list(service: &CatalogService, query: PageQuery) -> Result<Response> {
    let entries = service.list().await?;
    Ok(query.respond(entries))
}

async fn create(service: &CatalogService, payload: NamePayload) -> Result<Response> {
    let entry = service.create(payload.name).await?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

async fn update(service: &CatalogService, id: &str, payload: NamePayload) -> Result<Response> {
    let id = parse_id(id, service.catalog().not_found_message())?;
    let entry = service.update(id, payload.name).await?;
    Ok(Json(entry).into_response())
}

async fn delete(service: &CatalogService, id: &str) -> Result<Response> {
    let id = parse_id(id, service.catalog().not_found_message())?;
    service.delete(id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[utoipa::path(
    get,
    path = "/api/positions",
    responses((status = 200, description = "Positions sorted by name"))
)]
pub async fn list_positions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    list(&state.position_service, query).await
}

#[utoipa::path(
    post,
    path = "/api/positions",
    responses(
        (status = 201, description = "Position created"),
        (status = 400, description = "Blank name")
    )
)]
pub async fn create_position(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Result<Response> {
    create(&state.position_service, payload).await
}

#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    params(("id" = i32, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position renamed"),
        (status = 404, description = "Position not found")
    )
)]
pub async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> Result<Response> {
    update(&state.position_service, &id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    params(("id" = i32, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position deleted"),
        (status = 404, description = "Position not found")
    )
)]
pub async fn delete_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    delete(&state.position_service, &id).await
}

#[utoipa::path(
    get,
    path = "/api/curators",
    responses((status = 200, description = "Curators sorted by name"))
)]
pub async fn list_curators(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    list(&state.curator_service, query).await
}

#[utoipa::path(
    post,
    path = "/api/curators",
    responses(
        (status = 201, description = "Curator created"),
        (status = 400, description = "Blank name")
    )
)]
pub async fn create_curator(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Result<Response> {
    create(&state.curator_service, payload).await
}

#[utoipa::path(
    put,
    path = "/api/curators/{id}",
    params(("id" = i32, Path, description = "Curator ID")),
    responses(
        (status = 200, description = "Curator renamed"),
        (status = 404, description = "Curator not found")
    )
)]
pub async fn update_curator(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> Result<Response> {
    update(&state.curator_service, &id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/curators/{id}",
    params(("id" = i32, Path, description = "Curator ID")),
    responses(
        (status = 200, description = "Curator deleted"),
        (status = 404, description = "Curator not found")
    )
)]
pub async fn delete_curator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    delete(&state.curator_service, &id).await
}

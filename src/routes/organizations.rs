use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::auth_dto::MessageResponse,
    dto::catalog_dto::NamePayload,
    dto::page_dto::PageQuery,
    error::Result,
    middleware::auth::CurrentUser,
    routes::parse_id,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/organizations",
    responses(
        (status = 200, description = "Organizations sorted by name")
    )
)]
#[axum::debug_handler]
pub async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let organizations = state.organization_service.list().await?;
    Ok(query.respond(organizations))
}

#[utoipa::path(
    post,
    path = "/api/organizations",
    responses(
        (status = 201, description = "Organization created"),
        (status = 400, description = "Name missing")
    )
)]
#[axum::debug_handler]
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse> {
    let organization = state
        .organization_service
        .create(payload.name, current.id)
        .await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    params(
        ("id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization deleted"),
        (status = 404, description = "Organization not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "Организация не найдена")?;
    state.organization_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Организация удалена")))
}

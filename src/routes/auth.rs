use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::auth_dto::{ChangePasswordPayload, LoginPayload},
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Token and user summary"),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Bad credentials or disabled account"),
        (status = 429, description = "Too many login attempts")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing fields, wrong current password or policy violation"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service.change_password(current.id, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.me(current.id).await?;
    Ok(Json(user))
}

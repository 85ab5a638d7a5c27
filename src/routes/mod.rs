pub mod auth;
pub mod catalogs;
pub mod external_connections;
pub mod health;
pub mod organizations;
pub mod records;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::middleware::{
    auth::{require_admin, require_auth},
    cors::journal_cors,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Path ids arrive as strings so that garbage yields a readable 400 rather
/// than the extractor's plain-text rejection.
pub fn parse_id(raw: &str, message: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::BadRequest(message.to_string()))
}

/// Full HTTP surface. Reads need a session; user management and the
/// organization, catalog and connection add/delete routes need an admin.
pub fn app_router(state: AppState, login_rps: u32) -> Router {
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .layer(from_fn_with_state(new_rps_state(login_rps), rps_middleware));

    let authenticated = Router::new()
        .route("/api/auth/change-password", put(auth::change_password))
        .route("/api/auth/me", get(auth::me))
        .route("/api/organizations", get(organizations::list_organizations))
        .route("/api/positions", get(catalogs::list_positions))
        .route("/api/curators", get(catalogs::list_curators))
        .route(
            "/api/external-connections",
            get(external_connections::list_external_connections),
        )
        .route(
            "/api/external-connections/:id",
            put(external_connections::update_external_connection),
        )
        .route(
            "/api/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/api/records/export", get(records::export_records))
        .route(
            "/api/records/:id",
            put(records::update_record).delete(records::delete_record),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/api/organizations", post(organizations::create_organization))
        .route(
            "/api/organizations/:id",
            delete(organizations::delete_organization),
        )
        .route("/api/positions", post(catalogs::create_position))
        .route(
            "/api/positions/:id",
            put(catalogs::update_position).delete(catalogs::delete_position),
        )
        .route("/api/curators", post(catalogs::create_curator))
        .route(
            "/api/curators/:id",
            put(catalogs::update_curator).delete(catalogs::delete_curator),
        )
        .route(
            "/api/external-connections/add",
            post(external_connections::add_external_connection),
        )
        .route(
            "/api/external-connections/:id",
            delete(external_connections::delete_external_connection),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health))
        .merge(login)
        .merge(authenticated)
        .merge(admin)
        .with_state(state)
        .layer(journal_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id("42", "x").unwrap(), 42);
        assert!(matches!(parse_id("abc", "Неверный ID"), Err(Error::BadRequest(m)) if m == "Неверный ID"));
        assert!(parse_id("0", "x").is_err());
        assert!(parse_id("-3", "x").is_err());
    }
}

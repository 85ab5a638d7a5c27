use axum::http::{
    header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
    Method,
};
use tower_http::cors::{Any, CorsLayer};

/// The browser client is served from a different origin and downloads
/// exports, so `Content-Disposition` has to be readable.
pub fn journal_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION])
        .allow_origin(Any)
}

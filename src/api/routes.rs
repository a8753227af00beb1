use crate::AppState;
use crate::types::{AppError, Result};
use axum::{Router, http::HeaderValue, routing::post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Only `cors_origin` may call the API from a browser; credentials are
/// allowed and requested methods and headers are mirrored back.
pub fn create_router(cors_origin: &str) -> Result<Router<AppState>> {
    let origin = HeaderValue::from_str(cors_origin).map_err(|e| {
        AppError::Configuration(format!("Invalid CORS origin '{}': {}", cors_origin, e))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/chat", post(crate::api::handlers::chat::chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

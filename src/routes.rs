use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// GET / — deployment smoke-check banner.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hobby Matcher API is running" }))
}

/// GET /api/wake-up — keep-alive probe for free-tier hosting.
async fn wake_up() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Server is awake" }))
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Build the CORS layer from the configured origin allowlist.
/// Invalid origins are skipped with a warning rather than failing startup.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    // WebSocket endpoint (unauthenticated; identity arrives via register-user)
    let ws_routes = Router::new().route("/ws", get(ws_handler::ws_upgrade));

    let http_routes = Router::new()
        .route("/", get(root))
        .route("/api/wake-up", get(wake_up))
        .route("/health", get(health_check));

    Router::new()
        .merge(http_routes)
        .merge(ws_routes)
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Root index and the `/ws` socket endpoint
 * 2. Public API routes (register, login, health)
 * 3. Protected API routes (everything else under `/api`)
 * 4. Fallback handler (404 JSON envelope)
 *
 * Every `/api` route sits behind the per-IP rate limiter. Request
 * tracing, CORS and the security response headers wrap the whole router.
 */

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::backend::middleware::rate_limit_middleware;
use crate::backend::realtime::handle_socket_upgrade;
use crate::backend::routes::api_routes::{configure_protected_routes, configure_public_routes};
use crate::backend::server::state::AppState;
use crate::shared::response::ApiResponse;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the store, hub and token service
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let cors = cors_layer(&app_state.config.cors_origin);

    let api = configure_public_routes(Router::new())
        .merge(configure_protected_routes(app_state.clone()))
        .route_layer(from_fn_with_state(
            app_state.limiter.clone(),
            rate_limit_middleware,
        ));

    let router = Router::new()
        .route("/", get(index))
        .route("/ws", get(handle_socket_upgrade))
        .merge(api)
        .fallback(not_found);

    with_security_headers(router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

const SECURITY_HEADERS: [(HeaderName, &str); 7] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::X_XSS_PROTECTION, "0"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=15552000; includeSubDomains",
    ),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; frame-ancestors 'self'; object-src 'none'",
    ),
];

/// Add the standard hardening headers to every response
///
/// Headers a handler already set are left alone.
fn with_security_headers(router: Router<AppState>) -> Router<AppState> {
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        })
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, cross-origin requests disabled", origin);
            layer
        }
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Team collaboration API",
        "endpoints": {
            "auth": "/api/auth",
            "teams": "/api/teams",
            "projects": "/api/projects",
            "tasks": "/api/tasks",
            "messages": "/api/messages",
            "health": "/api/health",
            "socket": "/ws",
        },
    }))
}

async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("Route not found", Vec::new())),
    )
}

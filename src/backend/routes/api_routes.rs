/**
 * API Route Handlers
 *
 * This module wires the `/api` endpoints to their handlers.
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/auth/register` - User registration
 * - `POST /api/auth/login` - User login
 * - `GET /api/health` - Liveness probe
 *
 * ## Protected (Bearer token)
 * - `GET /api/auth/me` - Current user
 * - `POST /api/teams` - Create a team
 * - `GET|POST /api/projects`, `PUT|DELETE /api/projects/{id}`
 * - `GET|POST /api/tasks`, `PUT|DELETE /api/tasks/{id}`
 * - `GET|POST /api/messages`
 */

use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};

use crate::backend::auth::{get_me, login, register};
use crate::backend::messages::handlers as messages;
use crate::backend::middleware::auth_middleware;
use crate::backend::projects::handlers as projects;
use crate::backend::server::state::AppState;
use crate::backend::tasks::handlers as tasks;
use crate::backend::teams::handlers as teams;

/// Routes reachable without a token
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/health", get(health))
}

/// Routes behind `auth_middleware`
///
/// # Arguments
///
/// * `state` - Application state, needed by the middleware to verify tokens
///
/// # Authentication
///
/// The middleware is attached with `route_layer`, so unknown paths still
/// reach the 404 fallback instead of answering 401.
pub fn configure_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/teams", post(teams::create_team))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

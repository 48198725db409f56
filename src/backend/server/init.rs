/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store selection, state creation, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL and run migrations when `DATABASE_URL` is set
 * 2. Fall back to the in-memory store otherwise
 * 3. Create `AppState` (store, fan-out hub, token service)
 * 4. Start the background task that prunes closed sockets and expired
 *    rate limit windows
 * 5. Create and configure the router
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::{AppState, SharedStore};
use crate::backend::store::{MemoryStore, PgStore};

const PRUNE_INTERVAL: Duration = Duration::from_secs(30);

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: Server continues on the in-memory store
/// - Connection or migration failures: Logged, in-memory store used
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing teamcollab backend server");

    let store: SharedStore = match load_database(&config).await {
        Some(pool) => {
            tracing::info!("Using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(config, store);
    spawn_pruner(state.clone());
    create_router(state)
}

/// Build the router on a caller-provided store
///
/// No background tasks are started; used by the integration tests.
pub fn build_router_with_store(config: ServerConfig, store: SharedStore) -> Router<()> {
    create_router(AppState::new(config, store))
}

fn spawn_pruner(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let pruned = state.fanout.prune_closed();
            if pruned > 0 {
                tracing::debug!(pruned, "Removed closed connections");
            }
            let expired = state.limiter.prune_expired(Instant::now());
            if expired > 0 {
                tracing::debug!(expired, "Removed expired rate limit windows");
            }
        }
    });
}

/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The repository (`PgStore` or `MemoryStore` behind a trait object)
 * - The team room fan-out hub
 * - The token service used to sign and verify sessions
 * - The per-IP request rate limiter
 * - The loaded server configuration
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share across tasks:
 * - `Arc<dyn Repository>` is `Send + Sync` by trait bound
 * - `FanoutHub` wraps its tables in `Arc<Mutex<>>`
 * - `TokenService` holds immutable keys
 * - `RateLimiter` wraps its counters in `Arc<Mutex<>>`
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part of the
 * state they need, e.g. `State(hub): State<FanoutHub>`.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::backend::auth::sessions::TokenService;
use crate::backend::middleware::RateLimiter;
use crate::backend::realtime::broadcast::FanoutHub;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::Repository;

/// Shared repository handle
pub type SharedStore = Arc<dyn Repository>;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Persistence for all domain records
    pub store: SharedStore,

    /// Team room registry for realtime delivery
    pub fanout: FanoutHub,

    /// Session token signing and verification
    pub tokens: TokenService,

    pub limiter: RateLimiter,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expire_secs);
        let limiter = RateLimiter::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            store,
            fanout: FanoutHub::new(),
            tokens,
            limiter,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for FanoutHub {
    fn from_ref(state: &AppState) -> Self {
        state.fanout.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> Self {
        state.limiter.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod password;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tracing::error;

use securetransact_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{JwtKeys, require_auth};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// `None` when the store could not be opened at startup; the server then
    /// runs in degraded mode and data routes answer 503.
    pub db: Option<Database>,
    pub jwt: JwtKeys,
}

impl AppStateInner {
    pub fn database_ready(&self) -> bool {
        self.db.is_some()
    }
}

/// Run blocking store work off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    if !state.database_ready() {
        return Err(ApiError::DatabaseUnavailable);
    }

    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        let db = state.db.as_ref().ok_or(ApiError::DatabaseUnavailable)?;
        f(db).map_err(ApiError::from)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })?
}

/// Ids travel as decimal strings in paths.
pub(crate) fn parse_id(raw: &str, what: &'static str) -> ApiResult<i64> {
    raw.trim().parse().map_err(|_| ApiError::BadId(what))
}

/// All routes, without CORS or tracing layers.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/db-test", get(health::db_test))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/users/{id}", get(users::get_user).put(users::update_user))
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/api/transactions/user/{user_id}",
            get(transactions::list_user_transactions),
        )
        .route("/api/transactions/{id}/status", put(transactions::update_status))
        .route("/api/transactions/{id}/messages", get(messages::get_messages))
        .route("/api/messages", post(messages::send_message))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}

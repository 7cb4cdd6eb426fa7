mod config;

use std::sync::Arc;

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use securetransact_api::middleware::JwtKeys;
use securetransact_api::{AppState, AppStateInner};
use securetransact_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "securetransact=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Environment: {}",
        if config.production { "production" } else { "development" }
    );
    if config.uses_placeholder_secret() {
        warn!("JWT_SECRET is unset or a placeholder; set a real secret before deploying");
    }

    let db = open_database(&config);
    let database_ready = db.is_some();

    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt: JwtKeys::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_expiry_hours),
        ),
    });

    let app = securetransact_api::router(app_state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("SecureTransact API listening on http://{}", config.addr);
    info!(
        "Mode: {}",
        if database_ready { "database" } else { "degraded (no database)" }
    );
    if !database_ready {
        warn!(
            "Database unavailable at {}; data routes will answer 503. \
             Check DATABASE_PATH and file permissions, then restart.",
            config.database_path.display()
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// A store that fails to open leaves the server up in degraded mode.
fn open_database(config: &Config) -> Option<Database> {
    let opened = if config.database_path.as_os_str() == ":memory:" {
        Database::open_in_memory()
    } else {
        Database::open(&config.database_path)
    };

    match opened {
        Ok(db) => {
            info!("Database ready");
            Some(db)
        }
        Err(e) => {
            error!("Database initialization failed: {:#}", e);
            None
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("SIGTERM handler unavailable: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

mod config;
mod session;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header::{ACCEPT, CONTENT_TYPE}};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use mercado_api::{AppStateInner, router};
use mercado_db::Database;
use mercado_storage::{IMAGES_ROUTE, StorageConfig, open_store};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mercado=debug,mercado_api=debug,mercado_db=debug,mercado_storage=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.has_placeholder_secret() {
        warn!("MERCADO_SESSION_SECRET is unset or still a placeholder; set a real secret before deploying");
    }

    // Database: lazy pool, then block until MySQL answers
    let db = Database::connect_lazy(&config.db);
    db.wait_until_ready(config.db_retry).await;

    // Sessions live in the same database
    let (session_store, deletion_task) =
        session::open_store(db.pool().clone(), &config.db.database).await?;
    let sessions = session::layer(
        session_store,
        config.session_cookie.clone(),
        &config.session_secret,
    );

    let store = open_store(&config.storage).await?;
    let state = Arc::new(AppStateInner { db: db.clone(), store });

    let origins = config
        .cors_origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_credentials(true);

    let mut app = router(state);
    if let StorageConfig::Disk { dir, .. } = &config.storage {
        app = app.nest_service(IMAGES_ROUTE, ServeDir::new(dir));
    }
    let app = app
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(sessions)
        .layer(DefaultBodyLimit::max(config.upload_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Mercado server listening on {}", config.addr);
    info!("CORS origins: {}", config.cors_origins.join(", "));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    db.close().await;
    info!("Mercado server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("SIGTERM handler unavailable: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
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

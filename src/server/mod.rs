use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use handlers::{
    add_connection, delete_connection, health_check, index, list_connections, read_hops,
    run_query, select_connection,
};

use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
};

use crate::config::ServerConfig;
use crate::connections::{ConnectionManager, JsonFileBackend};
use crate::database::{ClickHouseSessionFactory, OsIdentity};
use crate::executor::QueryExecutor;
use session::SessionRegistry;

pub mod errors;
pub mod handlers;
pub mod models;
pub mod render;
pub mod session;

/// Form bodies are small; SQL text is the largest thing posted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct AppState {
    pub connections: RwLock<ConnectionManager>,
    pub sessions: SessionRegistry,
    pub executor: QueryExecutor,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(connections: ConnectionManager, executor: QueryExecutor, config: ServerConfig) -> Self {
        Self {
            connections: RwLock::new(connections),
            sessions: SessionRegistry::new(),
            executor,
            config,
        }
    }
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/connections", get(list_connections))
        .route("/connections/add", post(add_connection))
        .route("/connections/delete", post(delete_connection))
        .route("/connections/select", post(select_connection))
        .route("/query", post(run_query))
        .route("/hops", get(read_hops))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::new())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::PRAGMA,
                    HeaderValue::from_static("no-cache"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::EXPIRES,
                    HeaderValue::from_static("0"),
                ))
                .layer(middleware::from_fn(session::ensure_session)),
        )
        .with_state(app_state)
}

pub async fn run_with_config(config: ServerConfig) -> anyhow::Result<()> {
    log::info!(
        "Server configuration: http={}:{}, profiles={}",
        config.http_host,
        config.http_port,
        config.profiles_path.display()
    );

    let backend = JsonFileBackend::new(&config.profiles_path);
    let connections = ConnectionManager::load(Box::new(backend)).with_context(|| {
        format!(
            "Failed to load connection profiles from {}",
            config.profiles_path.display()
        )
    })?;

    let identity = OsIdentity::current();
    log::info!("Database sessions will authenticate as {}", identity.principal());
    let executor = QueryExecutor::new(Arc::new(ClickHouseSessionFactory), identity);

    let http_bind_address = format!("{}:{}", config.http_host, config.http_port);
    let app = build_router(Arc::new(AppState::new(connections, executor, config)));

    log::info!("Starting HTTP server on {}", http_bind_address);
    let http_listener = TcpListener::bind(&http_bind_address)
        .await
        .with_context(|| format!("Failed to bind HTTP listener to {}", http_bind_address))?;
    log::info!("Successfully bound HTTP listener to {}", http_bind_address);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                log::error!(
                    "Failed to register SIGTERM handler: {}. Only Ctrl+C will stop the server.",
                    e
                );
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                }
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => log::info!("Received SIGTERM, shutting down..."),
            _ = tokio::signal::ctrl_c() => log::info!("Received SIGINT, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
        }
        log::info!("Received shutdown signal, shutting down...");
    }
}

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{Router, http::HeaderName, middleware::from_fn};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    AppState,
    assignment::sampling::{RandomSource, SeededRandom, ThreadRandom},
    config::{ServerConfig, StoreBackend},
    db::{self, PgStore},
    middleware::add_version_headers,
    routes,
    store::{DirectoryStore, InMemoryStore, PullRequestStore},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Full HTTP application: routes plus tracing, request-id, timeout and version layers.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    routes::router()
        .layer(from_fn(add_version_headers))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

pub struct Server;

impl Server {
    pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
        let random: Arc<dyn RandomSource> = match config.reviewer_seed {
            Some(seed) => {
                tracing::warn!(seed, "reviewer sampling uses a fixed seed");
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(ThreadRandom),
        };

        let (pull_requests, directory) =
            match (config.backend, config.database.as_ref()) {
                (StoreBackend::Postgres, Some(database)) => {
                    let options = database
                        .connect_options()
                        .context("invalid database settings")?;
                    let pool = db::create_pool(options, database.max_connections)
                        .await
                        .context("failed to connect to database")?;
                    db::migrate(&pool)
                        .await
                        .context("failed to run database migrations")?;
                    tracing::info!(
                        max_connections = database.max_connections,
                        "connected to database"
                    );
                    let store = Arc::new(PgStore::new(pool));
                    (store.clone() as Arc<dyn PullRequestStore>, store as Arc<dyn DirectoryStore>)
                }
                (StoreBackend::Postgres, None) => {
                    anyhow::bail!("postgres backend selected without database configuration")
                }
                (StoreBackend::Memory, _) => {
                    tracing::warn!("using in-memory store; state is lost on restart");
                    let store = Arc::new(InMemoryStore::new());
                    (store.clone() as Arc<dyn PullRequestStore>, store as Arc<dyn DirectoryStore>)
                }
            };

        let state = AppState::new(pull_requests, directory, random);
        let app = build_router(state, config.request_timeout);

        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.listen_addr))?;
        tracing::info!(addr = %config.listen_addr, "server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

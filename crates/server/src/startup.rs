use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, ServerConfig};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes;
use crate::state::ServerState;

/// Uploads directory, database pool and migrations, then the shared state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    common::env::ensure_env(Path::new(&cfg.api.uploads_dir)).await?;
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::migrate(&db).await?;
    info!("database migrations applied");
    Ok(ServerState::new(db, &cfg.auth, &cfg.api))
}

pub fn build_app(state: ServerState, cfg: &AppConfig) -> Router {
    routes::build_router(state, &cfg.api)
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, draining connections");
    }
}

/// Public entry: load config, build the app and run the HTTP server until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate()?;
    let state = build_state(&cfg).await?;
    let app = build_app(state, &cfg);

    let addr = bind_addr(&cfg.server)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, prefix = %cfg.api.prefix, docs = "/api-docs", "server listening");
    serve(listener, app, ctrl_c()).await?;
    info!("server stopped");
    Ok(())
}

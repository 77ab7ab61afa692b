use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use banter_api::AppStateInner;
use banter_db::Database;
use banter_store::Stores;

const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let session_secret = std::env::var("BANTER_SESSION_SECRET").unwrap_or_else(|_| {
        warn!("BANTER_SESSION_SECRET not set, using the development secret");
        DEV_SESSION_SECRET.into()
    });
    let db_path = std::env::var("BANTER_DB_PATH").unwrap_or_else(|_| "banter.db".into());
    let host = std::env::var("BANTER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("BANTER_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .context("BANTER_PORT is not a port number")?;

    // Init database and load every store before serving anything
    let db = Database::open(&PathBuf::from(&db_path))?;
    let stores = Stores::new(Arc::new(db));
    stores
        .load()
        .with_context(|| format!("Failed to load stores from {}", db_path))?;

    let state = Arc::new(AppStateInner::new(stores, session_secret));

    let app = banter_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Banter server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Space missions API server.
//!
//! Run from repo root: `cargo run -p mission-server`
//! Configure with `DATABASE_URL`, `STORE_BACKEND`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `BODY_LIMIT_BYTES`.

use space_missions::{app, init_tracing, AppConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing("space_missions=info,mission_server=info,tower_http=info");

    tracing::info!(backend = ?config.backend, "opening store");
    let state = config.app_state().await?;
    let router = app(state, config.body_limit);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

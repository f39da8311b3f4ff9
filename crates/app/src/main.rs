use std::sync::Arc;

use anyhow::Context;
use app::config::{Config, print_usage};
use app::{AppState, build_router, init_tracing};
use services::{AppServices, Clock};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(2);
        }
    };
    init_tracing(config.log_format);

    let services = AppServices::new_sqlite(&config.db_url, Clock::default())
        .await
        .with_context(|| format!("failed to open database {}", config.db_url))?;
    let router = build_router(Arc::new(AppState::new(services)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, db = %config.db_url, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

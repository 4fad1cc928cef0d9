use attendance_dashboard::{AppState, Config, KeyValueStore, build_source, load_filters, router};
use chrono::Local;
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.state_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = KeyValueStore::open(config.state_path.clone()).await;
    let filters = load_filters(&store, Local::now().date_naive()).await;
    let source = build_source(&config)?;
    let state = AppState::new(source, store, filters, config.policy);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        "weekly off on {}, duplicates resolved by {:?}",
        config.policy.weekly_off, config.policy.duplicates
    );
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}

use anyhow::Result;
use guard_service::config::load_guard_settings;
use guard_service::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_guard_settings()?;
    let addr = settings.listen_addr;
    info!(
        leeway_seconds = settings.guard.leeway_seconds,
        issuer = settings.guard.issuer.as_deref().unwrap_or("-"),
        "loaded guard configuration"
    );

    let state = AppState {
        guard: settings.into_guard(),
    };
    let app = build_router(state);

    info!(%addr, "starting guard-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

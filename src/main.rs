use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod league;
mod rate_limit;
mod session;
mod shared;
mod store;

use app::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = AppConfig::from_env()?;
  let state = Arc::new(AppState::from_config(&config));

  // Surface a broken data file at boot rather than on the first request.
  let document = state.store.load().await?;
  tracing::info!(
    path = %state.store.path().display(),
    leagues = document.leagues.len(),
    master_enabled = state.master.is_enabled(),
    "league store ready"
  );

  let app = app::router(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .with_graceful_shutdown(shutdown_signal())
  .await?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(error) = signal::ctrl_c().await {
      tracing::warn!(?error, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(error) => {
        tracing::warn!(?error, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutdown signal received");
}

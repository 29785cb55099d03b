use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use salus_bridge::{
    api::{self, AppState},
    config::Config,
    gateway::{self, simulated::SimulatedGateway, Gateway},
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; variables may come from the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Refuses to start without gateway host and EUID
    let config = Config::from_env()?;

    let mut client = match &config.devices_file {
        Some(path) => SimulatedGateway::from_file(path).await?,
        None => {
            warn!("SALUS_DEVICES_FILE not set; simulated gateway starts with no devices");
            SimulatedGateway::new(Vec::new())
        }
    };
    client.connect().await?;
    client.poll_status().await?;
    info!(
        host = %config.gateway_host,
        euid = %config.gateway_euid,
        "Simulated Salus gateway connected"
    );

    let gateway = gateway::shared(client);
    let state = AppState::new(gateway.clone(), &config.gateway_host);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    gateway.lock().await.close().await?;
    info!("Gateway connection closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

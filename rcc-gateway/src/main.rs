//! Northbound gateway binary: HTTP/JSON command surface + SSE telemetry.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rcc_core::config::Config;
use rcc_core::http_adapter::VendorHttpAdapter;
use rcc_gateway::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "rcc-gateway", about = "Radio Control Container gateway")]
struct Args {
    /// Path to a TOML configuration file (see spec §6 for recognized keys).
    #[arg(long, env = "RCC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(p) = args.port {
        config.network.http_port = p;
    }

    let radios = config.radios.clone();
    let capability_deadline = config.read_deadline();
    let state = AppState::new(config);

    for radio in radios {
        let adapter = Arc::new(VendorHttpAdapter::new(radio.id.clone(), radio.base_url.clone()));
        match state
            .manager
            .load(radio.id.clone(), radio.model.clone(), adapter, capability_deadline)
            .await
        {
            Ok(()) => tracing::info!(radio_id = %radio.id, model = %radio.model, "radio loaded"),
            Err(err) => tracing::warn!(radio_id = %radio.id, error = %err, "radio failed to load at start-up"),
        }
    }

    let http_port = state.config.read().await.network.http_port;
    let app = rcc_gateway::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", http_port)).await?;
    tracing::info!(port = http_port, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    {
        let terminate = async {
            if let Ok(mut sig) =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            {
                sig.recv().await;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

//! Standalone vendor-protocol emulator binary (spec §4.7).

mod maintenance;
mod rpc;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::Router;
use clap::Parser;
use rcc_core::config::Config;
use rcc_core::emulator::device::{EmulatorConfig, EmulatorDevice};

#[derive(Parser, Debug)]
#[command(name = "rcc-emulator", about = "Vendor-protocol radio emulator")]
struct Args {
    /// Path to a TOML configuration file (see spec §6 for recognized keys).
    #[arg(long, env = "RCC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the JSON-RPC HTTP port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the maintenance TCP port.
    #[arg(long)]
    maintenance_port: Option<u16>,

    /// The radio identity this emulator instance presents as.
    #[arg(long, default_value = "emulated-radio")]
    radio_id: String,

    /// The vendor model string reported in inventory listings.
    #[arg(long, default_value = "streamscape-emulator")]
    model: String,
}

pub struct AppState {
    pub device: Arc<EmulatorDevice>,
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
    if let Some(p) = args.maintenance_port {
        config.network.maintenance_port = p;
    }

    let profiles = if config.profiles.is_empty() {
        default_profiles()
    } else {
        config.profiles.clone()
    };
    let default_frequency_mhz = rcc_core::profile::frequency_for_channel(&profiles, 1)
        .unwrap_or(profiles_first_scalar(&profiles));

    let device_config = EmulatorConfig {
        min_dbm: config.power.min_dbm,
        max_dbm: config.power.max_dbm,
        soft_boot: Duration::from_secs(config.timing.blackout.soft_boot_sec),
        power_change: Duration::from_secs(config.timing.blackout.power_change_sec),
        radio_reset: Duration::from_secs(config.timing.blackout.radio_reset_sec),
        profiles,
        default_power_dbm: config.power.min_dbm,
        default_frequency_mhz,
    };
    let device = Arc::new(EmulatorDevice::new(args.radio_id.clone(), device_config));
    let state = Arc::new(AppState { device });

    let app = Router::new()
        .route("/streamscape_api", post(rpc::handle_streamscape))
        .with_state(state.clone());

    let http_addr = ("0.0.0.0", config.network.http_port);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(port = config.network.http_port, radio_id = %args.radio_id, model = %args.model, "emulator JSON-RPC listening");

    let maintenance_state = state.clone();
    let maintenance_port = config.network.maintenance_port;
    let allowed = config.allowed_cidrs();
    let maintenance_task = tokio::spawn(async move {
        if let Err(err) = maintenance::serve(maintenance_port, allowed, maintenance_state).await {
            tracing::error!(error = %err, "maintenance listener stopped");
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    maintenance_task.abort();
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

fn default_profiles() -> Vec<rcc_core::profile::FrequencyProfile> {
    vec![rcc_core::profile::FrequencyProfile {
        frequencies: vec![rcc_core::profile::FrequencyEntry::Range {
            start: 2412.0,
            step: 5.0,
            end: 2472.0,
        }],
        bandwidth_mhz: 20.0,
        antenna_mask: 0b11,
    }]
}

fn profiles_first_scalar(profiles: &[rcc_core::profile::FrequencyProfile]) -> f64 {
    for p in profiles {
        if let Some(rcc_core::profile::FrequencyEntry::Scalar(v)) = p.frequencies.first() {
            return *v;
        }
        if let Some(rcc_core::profile::FrequencyEntry::Range { start, .. }) = p.frequencies.first()
        {
            return *start;
        }
    }
    100.0
}

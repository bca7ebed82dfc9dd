//! Shared application state handed to every axum handler.

use std::sync::Arc;

use rcc_core::audit::{AuditSink, LoggingSink};
use rcc_core::config::Config;
use rcc_core::manager::RadioManager;
use rcc_core::orchestrator::{AllowAll, Orchestrator};
use rcc_core::telemetry::{HeartbeatConfig, TelemetryHub};
use tokio::sync::RwLock;

pub struct AppState {
    pub manager: Arc<RadioManager>,
    pub orchestrator: Arc<Orchestrator>,
    pub telemetry: Arc<TelemetryHub>,
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let heartbeat = HeartbeatConfig {
            base: std::time::Duration::from_secs(config.timing.heartbeat.interval_sec),
            jitter: std::time::Duration::from_secs(config.timing.heartbeat.jitter_sec),
        };
        let manager = Arc::new(RadioManager::new());
        let telemetry = TelemetryHub::new(heartbeat);
        let audit = Arc::new(AuditSink::new(Arc::new(LoggingSink)));
        let config = Arc::new(RwLock::new(config));
        let orchestrator = Arc::new(Orchestrator::new(
            manager.clone(),
            telemetry.clone(),
            audit,
            Arc::new(AllowAll),
            config.clone(),
        ));
        Arc::new(Self {
            manager,
            orchestrator,
            telemetry,
            config,
        })
    }
}

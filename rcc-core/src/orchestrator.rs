//! Command Orchestrator: validation, routing, deadlines, normalization,
//! telemetry publication and audit emission for every command (spec §4.4).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::RwLock;

use crate::adapter::Adapter;
use crate::audit::AuditSink;
use crate::config::Config;
use crate::deadline::with_deadline;
use crate::error::{normalize, AdapterError, NormalizedError};
use crate::manager::{ManagerError, RadioManager};
use crate::model::{AuditRecord, CommandKind, DeadlineClass, Outcome, RadioState, TelemetryPayload};
use crate::profile::{self, FrequencyProfile};
use crate::telemetry::TelemetryHub;

/// The authentication layer is an external collaborator (spec §1); the
/// Orchestrator only needs a capability predicate to call. The default
/// allows everything so the gateway is runnable with auth plumbed in later.
#[async_trait]
pub trait CapabilityCheck: Send + Sync {
    async fn allowed(&self, actor: &str, radio_id: Option<&str>, command: &CommandKind) -> bool;
}

pub struct AllowAll;

#[async_trait]
impl CapabilityCheck for AllowAll {
    async fn allowed(&self, _actor: &str, _radio_id: Option<&str>, _command: &CommandKind) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorError {
    pub code: NormalizedError,
    pub message: String,
}

impl OrchestratorError {
    fn new(code: NormalizedError, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CommandResult {
    Empty,
    Power { power_dbm: f64 },
    Channel { channel_index: u32, frequency_mhz: f64 },
    State(RadioState),
    Profiles(Vec<FrequencyProfile>),
    ActiveRadio { active_radio_id: Option<String> },
}

pub struct Orchestrator {
    manager: Arc<RadioManager>,
    telemetry: Arc<TelemetryHub>,
    audit: Arc<AuditSink>,
    auth: Arc<dyn CapabilityCheck>,
    config: Arc<RwLock<Config>>,
    /// Per-radio FIFO serializer: a command holds the radio's mutex for the
    /// duration of its adapter call so that audit order matches the
    /// adapter's observed order (spec §4.4, §5).
    serializers: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        manager: Arc<RadioManager>,
        telemetry: Arc<TelemetryHub>,
        audit: Arc<AuditSink>,
        auth: Arc<dyn CapabilityCheck>,
        config: Arc<RwLock<Config>>,
    ) -> Self {
        Self {
            manager,
            telemetry,
            audit,
            auth,
            config,
            serializers: AsyncMutex::new(HashMap::new()),
        }
    }

    async fn serializer_for(&self, radio_id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.serializers.lock().await;
        map.entry(radio_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    async fn deadline_for(&self, class: DeadlineClass) -> Duration {
        let config = self.config.read().await;
        match class {
            DeadlineClass::SetPower => config.set_power_deadline(),
            DeadlineClass::SetChannel => config.set_channel_deadline(),
            DeadlineClass::SelectRadio => config.select_radio_deadline(),
            DeadlineClass::Read => config.read_deadline(),
        }
    }

    /// Execute one command end to end. `actor` identifies the caller for
    /// audit purposes; `radio_id` is `None` only for commands that do not
    /// target a specific radio (there are none today, but the hook stays
    /// general for `SelectActive`, which still names a target radio).
    pub async fn execute(
        &self,
        actor: &str,
        radio_id: &str,
        command: CommandKind,
    ) -> Result<CommandResult, OrchestratorError> {
        let start = Instant::now();
        let action = command.action().to_string();

        let result = self.execute_inner(actor, radio_id, &command).await;

        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(e) => e.code.into(),
        };
        self.audit.append(AuditRecord {
            ts: Utc::now(),
            user: actor.to_string(),
            radio_id: radio_id.to_string(),
            action,
            outcome,
            latency_ms: start.elapsed().as_millis() as u64,
        });

        if let Err(e) = &result {
            if e.code != NormalizedError::NotFound {
                self.telemetry
                    .publish(TelemetryPayload::Fault {
                        radio_id: radio_id.to_string(),
                        code: e.code,
                        message: e.message.clone(),
                        details: None,
                        ts: Utc::now(),
                    })
                    .await;
            }
        }

        result
    }

    async fn execute_inner(
        &self,
        actor: &str,
        radio_id: &str,
        command: &CommandKind,
    ) -> Result<CommandResult, OrchestratorError> {
        if !self.auth.allowed(actor, Some(radio_id), command).await {
            return Err(OrchestratorError::new(
                NormalizedError::Unavailable,
                "not authorized",
            ));
        }

        validate_shape(command)?;

        let adapter = self
            .manager
            .resolve(radio_id)
            .await
            .map_err(map_manager_error)?;

        if matches!(command, CommandKind::SelectActive { .. }) {
            self.manager
                .select_active(radio_id)
                .await
                .map_err(map_manager_error)?;
            return Ok(CommandResult::ActiveRadio {
                active_radio_id: self.manager.active_radio_id().await,
            });
        }

        let deadline = self.deadline_for(command.deadline_class()).await;
        let serializer = self.serializer_for(radio_id).await;
        let _permit = serializer.lock().await;

        let outcome = self.invoke(radio_id, &adapter, command, deadline).await;

        match outcome {
            Ok(result) => {
                self.publish_success(radio_id, command, &result).await;
                Ok(result)
            }
            Err(adapter_err) => {
                let code = normalize(&adapter_err);
                Err(OrchestratorError::new(code, adapter_err.to_string()))
            }
        }
    }

    async fn invoke(
        &self,
        radio_id: &str,
        adapter: &Arc<dyn Adapter>,
        command: &CommandKind,
        deadline: Duration,
    ) -> Result<CommandResult, AdapterError> {
        match command {
            CommandKind::SetPower { dbm } => {
                with_deadline(deadline, adapter.set_power(*dbm)).await?;
                Ok(CommandResult::Power { power_dbm: *dbm })
            }
            CommandKind::SetFrequency { mhz } => {
                // Profiles are fetched from the Radio Manager's cache, not the
                // adapter, because `set_frequency` enters Blackout immediately
                // and a post-call adapter query would be rejected with
                // UNAVAILABLE (see `SetChannelIndex` below, which fetches
                // first for the same reason).
                let profiles = self
                    .manager
                    .capabilities(radio_id)
                    .await
                    .unwrap_or_default();
                with_deadline(deadline, adapter.set_frequency(*mhz)).await?;
                let channel_index = profile::derive_channel_index(&profiles, *mhz);
                Ok(CommandResult::Channel {
                    channel_index,
                    frequency_mhz: *mhz,
                })
            }
            CommandKind::SetChannelIndex { index } => {
                let profiles =
                    with_deadline(deadline, adapter.supported_frequency_profiles()).await?;
                let mhz = profile::frequency_for_channel(&profiles, *index)
                    .ok_or_else(|| AdapterError::vendor("INVALID_RANGE"))?;
                with_deadline(deadline, adapter.set_frequency(mhz)).await?;
                Ok(CommandResult::Channel {
                    channel_index: *index,
                    frequency_mhz: mhz,
                })
            }
            CommandKind::GetState => {
                let state = with_deadline(deadline, adapter.get_state()).await?;
                Ok(CommandResult::State(state))
            }
            CommandKind::ReadPowerActual => {
                let dbm = with_deadline(deadline, adapter.read_power_actual()).await?;
                Ok(CommandResult::Power { power_dbm: dbm })
            }
            CommandKind::ListProfiles => {
                let profiles =
                    with_deadline(deadline, adapter.supported_frequency_profiles()).await?;
                Ok(CommandResult::Profiles(profiles))
            }
            CommandKind::Maintenance { op } => {
                with_deadline(deadline, adapter.maintenance(*op)).await?;
                Ok(CommandResult::Empty)
            }
            CommandKind::SelectActive { .. } => unreachable!("handled before invoke()"),
        }
    }

    async fn publish_success(&self, radio_id: &str, command: &CommandKind, result: &CommandResult) {
        match (command, result) {
            (CommandKind::SetPower { .. }, CommandResult::Power { power_dbm }) => {
                self.telemetry
                    .publish(TelemetryPayload::PowerChanged {
                        radio_id: radio_id.to_string(),
                        power_dbm: *power_dbm,
                        ts: Utc::now(),
                    })
                    .await;
            }
            (
                CommandKind::SetFrequency { .. } | CommandKind::SetChannelIndex { .. },
                CommandResult::Channel {
                    channel_index,
                    frequency_mhz,
                },
            ) => {
                self.telemetry
                    .publish(TelemetryPayload::ChannelChanged {
                        radio_id: radio_id.to_string(),
                        channel_index: *channel_index,
                        frequency_mhz: *frequency_mhz,
                        ts: Utc::now(),
                    })
                    .await;
            }
            _ => {}
        }
    }
}

fn map_manager_error(e: ManagerError) -> OrchestratorError {
    match e {
        ManagerError::NotFound => OrchestratorError::new(NormalizedError::NotFound, "radio not found"),
        ManagerError::LoadUnavailable => {
            OrchestratorError::new(NormalizedError::Unavailable, "radio unavailable")
        }
    }
}

/// API-layer shape/range validation, re-checked here as the Orchestrator's
/// own defense in depth (spec §4.4 step 2, §6 input constraints).
fn validate_shape(command: &CommandKind) -> Result<(), OrchestratorError> {
    match command {
        CommandKind::SetPower { dbm } => {
            if !dbm.is_finite() {
                return Err(OrchestratorError::new(
                    NormalizedError::InvalidRange,
                    "powerDbm must be a finite number",
                ));
            }
        }
        CommandKind::SetFrequency { mhz } => {
            if !mhz.is_finite() || *mhz <= 0.0 || *mhz < 100.0 || *mhz > 6000.0 {
                return Err(OrchestratorError::new(
                    NormalizedError::InvalidRange,
                    "frequencyMhz must be in [100, 6000]",
                ));
            }
        }
        CommandKind::SetChannelIndex { index } => {
            if *index == 0 {
                return Err(OrchestratorError::new(
                    NormalizedError::InvalidRange,
                    "channelIndex must be a positive integer",
                ));
            }
        }
        CommandKind::Maintenance { op } => {
            let _ = op; // no shape to validate; kept for exhaustiveness/documentation
        }
        _ => {}
    }
    Ok(())
}

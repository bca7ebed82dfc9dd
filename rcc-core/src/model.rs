//! Domain model (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NormalizedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioStatus {
    Online,
    Offline,
    Degraded,
}

/// A point-in-time view of one radio, as surfaced by the Radio Manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioSummary {
    pub id: String,
    pub model: String,
    pub status: RadioStatus,
}

/// `{index, frequencyMhz}` — indexes are unique and stable for a radio's
/// lifetime (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub index: u32,
    #[serde(rename = "frequencyMhz")]
    pub frequency_mhz: f64,
}

/// The live, mutable state of one radio (spec §3 `RadioState`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioState {
    #[serde(rename = "powerDbm")]
    pub power_dbm: f64,
    #[serde(rename = "frequencyMhz")]
    pub frequency_mhz: f64,
    #[serde(rename = "channelIndex")]
    pub channel_index: u32,
    /// Monotonic instant (as millis since an arbitrary epoch) at which the
    /// radio becomes available again; `0` means not in blackout.
    #[serde(rename = "blackoutUntilMs")]
    pub blackout_until_ms: u64,
    pub mode: RadioMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RadioMode {
    Ready,
    Blackout,
    Offline,
}

/// Maintenance operations an adapter may optionally support (spec §4.1.a).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaintenanceOp {
    Zeroize,
    RadioReset,
    FactoryReset,
}

/// Tagged command record (spec §3 `Command`). `correlation` is an opaque
/// client-supplied or server-generated token used to tie together the audit
/// record, the telemetry event (if any) and the response.
#[derive(Debug, Clone)]
pub enum CommandKind {
    SetPower { dbm: f64 },
    SetFrequency { mhz: f64 },
    SetChannelIndex { index: u32 },
    GetState,
    ReadPowerActual,
    ListProfiles,
    SelectActive { radio_id: String },
    Maintenance { op: MaintenanceOp },
}

impl CommandKind {
    /// The action name recorded in the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            CommandKind::SetPower { .. } => "setPower",
            CommandKind::SetFrequency { .. } => "setFrequency",
            CommandKind::SetChannelIndex { .. } => "setChannel",
            CommandKind::GetState => "getState",
            CommandKind::ReadPowerActual => "readPowerActual",
            CommandKind::ListProfiles => "listProfiles",
            CommandKind::SelectActive { .. } => "selectRadio",
            CommandKind::Maintenance { op } => match op {
                MaintenanceOp::Zeroize => "zeroize",
                MaintenanceOp::RadioReset => "radioReset",
                MaintenanceOp::FactoryReset => "factoryReset",
            },
        }
    }

    /// Which per-command deadline budget this command draws from (spec §6).
    pub fn deadline_class(&self) -> DeadlineClass {
        match self {
            CommandKind::SetPower { .. } => DeadlineClass::SetPower,
            CommandKind::SetFrequency { .. } | CommandKind::SetChannelIndex { .. } => {
                DeadlineClass::SetChannel
            }
            CommandKind::SelectActive { .. } => DeadlineClass::SelectRadio,
            CommandKind::GetState
            | CommandKind::ReadPowerActual
            | CommandKind::ListProfiles
            | CommandKind::Maintenance { .. } => DeadlineClass::Read,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineClass {
    SetPower,
    SetChannel,
    SelectRadio,
    Read,
}

/// Audit outcome (spec §3 `AuditRecord.outcome`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    InvalidRange,
    Busy,
    Unavailable,
    Internal,
    Timeout,
    NotFound,
}

impl From<NormalizedError> for Outcome {
    fn from(e: NormalizedError) -> Self {
        match e {
            NormalizedError::InvalidRange => Outcome::InvalidRange,
            NormalizedError::NotFound => Outcome::NotFound,
            NormalizedError::Busy => Outcome::Busy,
            NormalizedError::Unavailable => Outcome::Unavailable,
            NormalizedError::Timeout => Outcome::Timeout,
            NormalizedError::Internal => Outcome::Internal,
        }
    }
}

/// Append-only audit record (spec §3, §4.6). Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub ts: DateTime<Utc>,
    pub user: String,
    #[serde(rename = "radioId")]
    pub radio_id: String,
    pub action: String,
    pub outcome: Outcome,
    #[serde(rename = "latencyMs")]
    pub latency_ms: u64,
}

/// Tagged telemetry event (spec §3 `TelemetryEvent`). `id` is assigned by the
/// Telemetry Hub, not by the publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TelemetryPayload {
    Ready {
        snapshot: serde_json::Value,
    },
    Heartbeat {
        ts: DateTime<Utc>,
    },
    PowerChanged {
        #[serde(rename = "radioId")]
        radio_id: String,
        #[serde(rename = "powerDbm")]
        power_dbm: f64,
        ts: DateTime<Utc>,
    },
    ChannelChanged {
        #[serde(rename = "radioId")]
        radio_id: String,
        #[serde(rename = "channelIndex")]
        channel_index: u32,
        #[serde(rename = "frequencyMhz")]
        frequency_mhz: f64,
        ts: DateTime<Utc>,
    },
    Fault {
        #[serde(rename = "radioId")]
        radio_id: String,
        code: NormalizedError,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
        ts: DateTime<Utc>,
    },
}

impl TelemetryPayload {
    /// The SSE `event:` field value (spec §6 wire format).
    pub fn event_name(&self) -> &'static str {
        match self {
            TelemetryPayload::Ready { .. } => "ready",
            TelemetryPayload::Heartbeat { .. } => "heartbeat",
            TelemetryPayload::PowerChanged { .. } => "powerChanged",
            TelemetryPayload::ChannelChanged { .. } => "channelChanged",
            TelemetryPayload::Fault { .. } => "fault",
        }
    }
}

/// A telemetry event with its stream-assigned monotonic id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub id: u64,
    #[serde(flatten)]
    pub payload: TelemetryPayload,
}


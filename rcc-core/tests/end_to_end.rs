//! End-to-end command scenarios against the in-process emulator adapter,
//! mirroring the concrete scenarios of spec §8.

use std::sync::Arc;
use std::time::Duration;

use rcc_core::adapter::Adapter;
use rcc_core::audit::{AuditSink, LoggingSink};
use rcc_core::config::Config;
use rcc_core::emulator::adapter::InProcessAdapter;
use rcc_core::emulator::device::{EmulatorConfig, EmulatorDevice};
use rcc_core::error::NormalizedError;
use rcc_core::manager::RadioManager;
use rcc_core::model::CommandKind;
use rcc_core::orchestrator::{AllowAll, CommandResult, Orchestrator};
use rcc_core::profile::{FrequencyEntry, FrequencyProfile};
use rcc_core::telemetry::{HeartbeatConfig, TelemetryHub};
use tokio::sync::RwLock;

fn wifi_plan() -> Vec<FrequencyProfile> {
    vec![FrequencyProfile {
        frequencies: vec![FrequencyEntry::Range {
            start: 2412.0,
            step: 5.0,
            end: 2472.0,
        }],
        bandwidth_mhz: 20.0,
        antenna_mask: 0b11,
    }]
}

async fn harness() -> Arc<Orchestrator> {
    let manager = Arc::new(RadioManager::new());
    let telemetry = TelemetryHub::new(HeartbeatConfig {
        base: Duration::from_secs(600),
        jitter: Duration::from_secs(0),
    });
    let audit = Arc::new(AuditSink::new(Arc::new(LoggingSink)));
    let config = Arc::new(RwLock::new(Config::default()));
    let orchestrator = Arc::new(Orchestrator::new(
        manager.clone(),
        telemetry,
        audit,
        Arc::new(AllowAll),
        config,
    ));

    let device_config = EmulatorConfig {
        min_dbm: 0.0,
        max_dbm: 39.0,
        soft_boot: Duration::from_millis(30),
        power_change: Duration::from_millis(20),
        radio_reset: Duration::from_millis(40),
        profiles: wifi_plan(),
        default_power_dbm: 5.0,
        default_frequency_mhz: 2412.0,
    };
    let adapter: Arc<dyn Adapter> = Arc::new(InProcessAdapter::new(Arc::new(EmulatorDevice::new(
        "silvus-001",
        device_config,
    ))));
    manager
        .load("silvus-001".into(), "silvus".into(), adapter, Duration::from_secs(1))
        .await
        .unwrap();

    orchestrator
}

#[tokio::test]
async fn happy_path_power_then_channel_then_read_back() {
    let orchestrator = harness().await;

    orchestrator
        .execute("tester", "silvus-001", CommandKind::SetPower { dbm: 10.0 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(25)).await;

    orchestrator
        .execute("tester", "silvus-001", CommandKind::SetChannelIndex { index: 6 })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(35)).await;

    let power = orchestrator
        .execute("tester", "silvus-001", CommandKind::ReadPowerActual)
        .await
        .unwrap();
    match power {
        CommandResult::Power { power_dbm } => assert_eq!(power_dbm, 10.0),
        other => panic!("expected Power, got {other:?}"),
    }

    let channel = orchestrator
        .execute("tester", "silvus-001", CommandKind::GetState)
        .await
        .unwrap();
    match channel {
        CommandResult::State(s) => {
            assert_eq!(s.channel_index, 6);
            assert_eq!(s.frequency_mhz, 2437.0);
        }
        other => panic!("expected State, got {other:?}"),
    }
}

#[tokio::test]
async fn range_violation_normalizes_to_invalid_range() {
    let orchestrator = harness().await;
    let err = orchestrator
        .execute("tester", "silvus-001", CommandKind::SetPower { dbm: 100.0 })
        .await
        .unwrap_err();
    assert_eq!(err.code, NormalizedError::InvalidRange);
}

/// Regression test: `setFrequency` with a value that lands exactly on a
/// configured grid point must report that grid point's channel index, not
/// `0`. `set_frequency` enters Blackout the instant it's called, so
/// `CommandKind::SetFrequency` must resolve the channel index from the
/// Radio Manager's cached capabilities rather than re-querying the
/// now-blacked-out adapter.
#[tokio::test]
async fn set_frequency_on_grid_point_reports_matching_channel_index() {
    let orchestrator = harness().await;

    let result = orchestrator
        .execute("tester", "silvus-001", CommandKind::SetFrequency { mhz: 2437.0 })
        .await
        .unwrap();
    match result {
        CommandResult::Channel {
            channel_index,
            frequency_mhz,
        } => {
            assert_eq!(channel_index, 6);
            assert_eq!(frequency_mhz, 2437.0);
        }
        other => panic!("expected Channel, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_radio_normalizes_to_not_found() {
    let orchestrator = harness().await;
    let err = orchestrator
        .execute("tester", "non-existent", CommandKind::ReadPowerActual)
        .await
        .unwrap_err();
    assert_eq!(err.code, NormalizedError::NotFound);
}

#[tokio::test]
async fn blackout_rejects_until_window_elapses() {
    let orchestrator = harness().await;
    orchestrator
        .execute("tester", "silvus-001", CommandKind::SetChannelIndex { index: 6 })
        .await
        .unwrap();

    let err = orchestrator
        .execute("tester", "silvus-001", CommandKind::ReadPowerActual)
        .await
        .unwrap_err();
    assert_eq!(err.code, NormalizedError::Unavailable);

    tokio::time::sleep(Duration::from_millis(40)).await;
    orchestrator
        .execute("tester", "silvus-001", CommandKind::ReadPowerActual)
        .await
        .unwrap();
}

#[tokio::test]
async fn select_active_requires_existing_radio() {
    let orchestrator = harness().await;
    let err = orchestrator
        .execute(
            "tester",
            "ghost",
            CommandKind::SelectActive {
                radio_id: "ghost".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, NormalizedError::NotFound);

    let result = orchestrator
        .execute(
            "tester",
            "silvus-001",
            CommandKind::SelectActive {
                radio_id: "silvus-001".into(),
            },
        )
        .await
        .unwrap();
    match result {
        CommandResult::ActiveRadio { active_radio_id } => {
            assert_eq!(active_radio_id.as_deref(), Some("silvus-001"));
        }
        other => panic!("expected ActiveRadio, got {other:?}"),
    }
}

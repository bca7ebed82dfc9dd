//! HTTP-level coverage for the northbound command surface, driven against
//! the in-process emulator adapter the same way `rcc-core`'s own end-to-end
//! suite does, but through the real `axum::Router` rather than calling the
//! orchestrator directly.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rcc_core::adapter::Adapter;
use rcc_core::config::Config;
use rcc_core::emulator::adapter::InProcessAdapter;
use rcc_core::emulator::device::{EmulatorConfig, EmulatorDevice};
use rcc_core::profile::{FrequencyEntry, FrequencyProfile};
use rcc_gateway::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

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

async fn app_with_radio() -> axum::Router {
    let state = AppState::new(Config::default());

    let device_config = EmulatorConfig {
        min_dbm: 0.0,
        max_dbm: 39.0,
        soft_boot: Duration::from_millis(20),
        power_change: Duration::from_millis(20),
        radio_reset: Duration::from_millis(20),
        profiles: wifi_plan(),
        default_power_dbm: 5.0,
        default_frequency_mhz: 2412.0,
    };
    let adapter: Arc<dyn Adapter> = Arc::new(InProcessAdapter::new(Arc::new(EmulatorDevice::new(
        "sim-001",
        device_config,
    ))));
    state
        .manager
        .load("sim-001".into(), "silvus".into(), adapter, Duration::from_secs(1))
        .await
        .unwrap();

    rcc_gateway::router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"], "ok");
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn set_channel_by_index_reports_matching_frequency() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(
            Request::post("/api/v1/radios/sim-001/channel")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"channelIndex":6}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"], "ok");
    assert_eq!(body["data"]["channelIndex"], 6);
    assert_eq!(body["data"]["frequencyMhz"], 2437.0);
}

/// Regression test: `setFrequency` with a value that lands exactly on a
/// configured grid point must resolve to that grid point's channel index,
/// not `0`. Catches the case where profiles were fetched from a
/// just-blacked-out adapter instead of the Radio Manager's cache.
#[tokio::test]
async fn set_channel_by_frequency_on_grid_point_resolves_channel_index() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(
            Request::post("/api/v1/radios/sim-001/channel")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"frequencyMhz":2437.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"], "ok");
    assert_eq!(body["data"]["channelIndex"], 6);
    assert_eq!(body["data"]["frequencyMhz"], 2437.0);
}

#[tokio::test]
async fn set_channel_requires_exactly_one_field() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(
            Request::post("/api/v1/radios/sim-001/channel")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"channelIndex":6,"frequencyMhz":2437.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["result"], "error");
    assert_eq!(body["code"], "INVALID_RANGE");
}

#[tokio::test]
async fn malformed_json_body_yields_invalid_range() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(
            Request::post("/api/v1/radios/sim-001/power")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["result"], "error");
    assert_eq!(body["code"], "INVALID_RANGE");
}

#[tokio::test]
async fn unknown_radio_yields_not_found() {
    let app = app_with_radio().await;
    let response = app
        .oneshot(
            Request::get("/api/v1/radios/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

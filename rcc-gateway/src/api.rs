//! HTTP handlers for the northbound command surface (spec §6).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rcc_core::model::CommandKind;
use rcc_core::orchestrator::CommandResult;
use rcc_proto::ApiResponse;
use serde::Deserialize;
use serde_json::json;

use crate::error::{bad_request, require_json, ApiError};
use crate::state::AppState;

/// No authentication layer is wired in (spec §1 treats it as an external
/// collaborator); every request is attributed to this fixed actor for audit
/// purposes until one is plugged in.
const ANONYMOUS_ACTOR: &str = "anonymous";

pub async fn health() -> Json<ApiResponse> {
    Json(ApiResponse::ok(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

pub async fn capabilities() -> Json<ApiResponse> {
    Json(ApiResponse::ok(json!({
        "telemetry": ["sse"],
        "commands": ["http-json"],
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

pub async fn list_radios(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.manager.list().await;
    let items: Vec<_> = snapshot
        .radios
        .iter()
        .map(|r| json!({"id": r.id, "model": r.model, "status": r.status}))
        .collect();
    Json(ApiResponse::ok(json!({
        "activeRadioId": snapshot.active_radio_id,
        "items": items,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(rename = "radioId")]
    pub radio_id: String,
}

pub async fn select_radio(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let body = require_json(body)?;
    let result = state
        .orchestrator
        .execute(
            ANONYMOUS_ACTOR,
            &body.radio_id,
            CommandKind::SelectActive {
                radio_id: body.radio_id.clone(),
            },
        )
        .await?;
    match result {
        CommandResult::ActiveRadio { active_radio_id } => {
            Ok(Json(ApiResponse::ok(json!({"activeRadioId": active_radio_id}))))
        }
        _ => unreachable!("selectRadio always yields CommandResult::ActiveRadio"),
    }
}

pub async fn get_radio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let summary = state.manager.get_summary(&id).await?;
    Ok(Json(ApiResponse::ok(json!({
        "id": summary.id,
        "model": summary.model,
        "status": summary.status,
    }))))
}

pub async fn get_power(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let result = state
        .orchestrator
        .execute(ANONYMOUS_ACTOR, &id, CommandKind::ReadPowerActual)
        .await?;
    match result {
        CommandResult::Power { power_dbm } => Ok(Json(ApiResponse::ok(json!({"powerDbm": power_dbm})))),
        _ => unreachable!("readPowerActual always yields CommandResult::Power"),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetPowerRequest {
    #[serde(rename = "powerDbm")]
    pub power_dbm: f64,
}

pub async fn set_power(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SetPowerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let body = require_json(body)?;
    let result = state
        .orchestrator
        .execute(
            ANONYMOUS_ACTOR,
            &id,
            CommandKind::SetPower { dbm: body.power_dbm },
        )
        .await?;
    match result {
        CommandResult::Power { power_dbm } => Ok(Json(ApiResponse::ok(json!({"powerDbm": power_dbm})))),
        _ => unreachable!("setPower always yields CommandResult::Power"),
    }
}

pub async fn get_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let result = state
        .orchestrator
        .execute(ANONYMOUS_ACTOR, &id, CommandKind::GetState)
        .await?;
    match result {
        CommandResult::State(radio_state) => Ok(Json(ApiResponse::ok(json!({
            "channelIndex": radio_state.channel_index,
            "frequencyMhz": radio_state.frequency_mhz,
        })))),
        _ => unreachable!("getState always yields CommandResult::State"),
    }
}

/// Exactly one of `channelIndex` or `frequencyMhz` must be present (spec §6).
#[derive(Debug, Deserialize)]
pub struct SetChannelRequest {
    #[serde(rename = "channelIndex")]
    pub channel_index: Option<u32>,
    #[serde(rename = "frequencyMhz")]
    pub frequency_mhz: Option<f64>,
}

pub async fn set_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SetChannelRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let body = require_json(body)?;
    let command = match (body.channel_index, body.frequency_mhz) {
        (Some(index), None) => CommandKind::SetChannelIndex { index },
        (None, Some(mhz)) => CommandKind::SetFrequency { mhz },
        _ => {
            return Err(bad_request(
                "exactly one of channelIndex or frequencyMhz must be present",
            ))
        }
    };
    let result = state.orchestrator.execute(ANONYMOUS_ACTOR, &id, command).await?;
    match result {
        CommandResult::Channel {
            channel_index,
            frequency_mhz,
        } => Ok(Json(ApiResponse::ok(json!({
            "channelIndex": channel_index,
            "frequencyMhz": frequency_mhz,
        })))),
        _ => unreachable!("setChannel/setFrequency always yields CommandResult::Channel"),
    }
}

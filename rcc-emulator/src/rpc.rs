//! JSON-RPC 2.0 handling for `/streamscape_api` (spec §4.7).
//!
//! Successful setters return `[""]`; readers return `[value]`. HTTP status
//! is always 200 for a well-formed JSON-RPC envelope, even when the payload
//! carries a JSON-RPC `error` — only malformed bytes ever produce something
//! other than 200, and even that is still routed through the JSON-RPC error
//! shape where possible.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use rcc_core::error::AdapterError;
use rcc_proto::jsonrpc::{
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use rcc_proto::{JsonRpcRequest, JsonRpcResponse};

use crate::AppState;

pub async fn handle_streamscape(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> (StatusCode, Json<JsonRpcResponse>) {
    let req: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error")),
            )
        }
    };

    if req.jsonrpc != "2.0" || req.method.is_empty() {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::error(
                req.id,
                INVALID_REQUEST,
                "Invalid Request",
            )),
        );
    }

    let response = match req.method.as_str() {
        "freq" => handle_freq(&state, &req).await,
        "power_dBm" => handle_power(&state, &req).await,
        "supported_frequency_profiles" => handle_profiles(&state, &req).await,
        _ => JsonRpcResponse::error(req.id.clone(), METHOD_NOT_FOUND, "Method not found"),
    };

    (StatusCode::OK, Json(response))
}

fn params_array(req: &JsonRpcRequest) -> Option<&Vec<Value>> {
    req.params.as_array()
}

async fn handle_freq(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = params_array(req) else {
        return JsonRpcResponse::error(req.id.clone(), INVALID_REQUEST, "Invalid Request");
    };
    if params.is_empty() {
        return match state.device.get_state().await {
            Ok(s) => JsonRpcResponse::success(req.id.clone(), json!([s.frequency_mhz])),
            Err(e) => domain_error(req, e),
        };
    }
    let Some(mhz) = params[0].as_f64() else {
        return JsonRpcResponse::domain_error(req.id.clone(), "INVALID_PARAMETER");
    };
    match state.device.set_frequency(mhz).await {
        Ok(()) => JsonRpcResponse::success(req.id.clone(), json!([""])),
        Err(e) => domain_error(req, e),
    }
}

async fn handle_power(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = params_array(req) else {
        return JsonRpcResponse::error(req.id.clone(), INVALID_REQUEST, "Invalid Request");
    };
    if params.is_empty() {
        return match state.device.read_power_actual().await {
            Ok(v) => JsonRpcResponse::success(req.id.clone(), json!([v])),
            Err(e) => domain_error(req, e),
        };
    }
    let Some(dbm) = params[0].as_f64() else {
        return JsonRpcResponse::domain_error(req.id.clone(), "INVALID_PARAMETER");
    };
    match state.device.set_power(dbm).await {
        Ok(()) => JsonRpcResponse::success(req.id.clone(), json!([""])),
        Err(e) => domain_error(req, e),
    }
}

async fn handle_profiles(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    match state.device.supported_frequency_profiles().await {
        Ok(profiles) => JsonRpcResponse::success(req.id.clone(), json!([profiles])),
        Err(e) => domain_error(req, e),
    }
}

fn domain_error(req: &JsonRpcRequest, e: AdapterError) -> JsonRpcResponse {
    let _ = INVALID_PARAMS;
    JsonRpcResponse::domain_error(req.id.clone(), e.wire_token())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Bytes;
    use axum::extract::State;
    use rcc_core::emulator::device::{EmulatorConfig, EmulatorDevice};
    use rcc_core::profile::{FrequencyEntry, FrequencyProfile};
    use serde_json::json;

    use super::*;
    use crate::AppState;

    fn state() -> Arc<AppState> {
        let config = EmulatorConfig {
            min_dbm: 0.0,
            max_dbm: 39.0,
            soft_boot: Duration::from_millis(10),
            power_change: Duration::from_millis(10),
            radio_reset: Duration::from_millis(10),
            profiles: vec![FrequencyProfile {
                frequencies: vec![FrequencyEntry::Range {
                    start: 2412.0,
                    step: 5.0,
                    end: 2472.0,
                }],
                bandwidth_mhz: 20.0,
                antenna_mask: 0b11,
            }],
            default_power_dbm: 5.0,
            default_frequency_mhz: 2412.0,
        };
        Arc::new(AppState {
            device: Arc::new(EmulatorDevice::new("emu-001", config)),
        })
    }

    fn request(method: &str, params: Value) -> Bytes {
        Bytes::from(
            serde_json::to_vec(&JsonRpcRequest::new(method, params, json!(1))).unwrap(),
        )
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (status, Json(response)) =
            handle_streamscape(State(state()), request("no_such_method", json!([]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let (status, Json(response)) =
            handle_streamscape(State(state()), Bytes::from_static(b"not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn freq_setter_then_getter_round_trip() {
        let state = state();
        let (_, Json(set)) =
            handle_streamscape(State(state.clone()), request("freq", json!([2437.0]))).await;
        assert!(set.error.is_none());

        // The device just entered Blackout; a read before it elapses comes
        // back as a domain error, not a panic or a stale value.
        let (_, Json(immediate_read)) =
            handle_streamscape(State(state.clone()), request("freq", json!([]))).await;
        assert!(immediate_read.error.is_some());

        tokio::time::sleep(Duration::from_millis(15)).await;
        let (_, Json(read)) = handle_streamscape(State(state), request("freq", json!([]))).await;
        assert_eq!(read.result.unwrap(), json!([2437.0]));
    }
}

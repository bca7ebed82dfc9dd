//! TCP maintenance surface, restricted to an allow-listed CIDR set (spec
//! §4.7). Wire encoding: one JSON-RPC request per line, one JSON-RPC
//! response per line — the simplest framing consistent with "TCP
//! maintenance port" and with no richer framing named anywhere in spec.md.

use std::net::SocketAddr;
use std::sync::Arc;

use ipnet::IpNet;
use rcc_core::model::MaintenanceOp;
use rcc_proto::jsonrpc::{INVALID_REQUEST, METHOD_NOT_FOUND};
use rcc_proto::{JsonRpcRequest, JsonRpcResponse};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::AppState;

pub async fn serve(port: u16, allowed: Vec<IpNet>, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "maintenance TCP listening");
    loop {
        let (socket, peer) = listener.accept().await?;
        let allowed = allowed.clone();
        let state = state.clone();
        tokio::spawn(async move {
            if !is_allowed(peer, &allowed) {
                tracing::warn!(%peer, "maintenance connection rejected: not in allow-list");
                return;
            }
            if let Err(err) = handle_connection(socket, state).await {
                tracing::warn!(%peer, error = %err, "maintenance connection ended with error");
            }
        });
    }
}

fn is_allowed(peer: SocketAddr, allowed: &[IpNet]) -> bool {
    allowed.iter().any(|net| net.contains(&peer.ip()))
}

async fn handle_connection(socket: TcpStream, state: Arc<AppState>) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(req) => dispatch(&state, req).await,
            Err(_) => JsonRpcResponse::error(serde_json::Value::Null, INVALID_REQUEST, "Invalid Request"),
        };
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;
    }
    Ok(())
}

async fn dispatch(state: &AppState, req: JsonRpcRequest) -> JsonRpcResponse {
    let op = match req.method.as_str() {
        "zeroize" => MaintenanceOp::Zeroize,
        "radio_reset" => MaintenanceOp::RadioReset,
        "factory_reset" => MaintenanceOp::FactoryReset,
        _ => return JsonRpcResponse::error(req.id, METHOD_NOT_FOUND, "Method not found"),
    };
    match state.device.maintenance(op).await {
        Ok(()) => JsonRpcResponse::success(req.id, json!([""])),
        Err(e) => JsonRpcResponse::domain_error(req.id, e.wire_token()),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use rcc_core::emulator::device::{EmulatorConfig, EmulatorDevice};
    use rcc_core::profile::{FrequencyEntry, FrequencyProfile};
    use serde_json::json;

    use super::*;
    use crate::AppState;

    fn state() -> AppState {
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
        AppState {
            device: Arc::new(EmulatorDevice::new("emu-001", config)),
        }
    }

    #[tokio::test]
    async fn radio_reset_succeeds_and_is_reported() {
        let state = state();
        let response = dispatch(&state, JsonRpcRequest::new("radio_reset", json!([]), json!(1))).await;
        assert_eq!(response.result.unwrap(), json!([""]));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let state = state();
        let response = dispatch(&state, JsonRpcRequest::new("reboot", json!([]), json!(1))).await;
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn allow_list_matches_only_configured_cidrs() {
        let allowed: Vec<IpNet> = vec!["127.0.0.1/32".parse().unwrap()];
        let localhost = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 40000);
        let other = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 40000);
        assert!(is_allowed(localhost, &allowed));
        assert!(!is_allowed(other, &allowed));
    }
}

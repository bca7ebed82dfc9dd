//! # Wire-level types shared between the gateway and the vendor emulator
//!
//! This crate carries only the bytes-on-the-wire shapes: the JSON-RPC 2.0
//! envelope used by the standalone vendor emulator process, and the
//! northbound response envelope used by the HTTP/JSON command surface.
//! Neither side's business logic lives here.

pub mod jsonrpc;
pub mod envelope;
pub mod profile;

pub use envelope::{ApiResponse, ErrorBody};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use profile::{FrequencyEntry, FrequencyProfile};

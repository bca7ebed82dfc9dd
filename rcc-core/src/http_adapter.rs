//! [`Adapter`] implementation that drives a standalone vendor emulator
//! process over its JSON-RPC/HTTP surface (spec §4.7).
//!
//! Wire convention: a bare getter is an empty-params call returning
//! `[value]`; a setter passes the new value as the sole element of `params`
//! and returns `[""]` on success. This mirrors the "successful setters
//! return `[""]`; readers return `[value]`" rule in spec §4.7.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use rcc_proto::{JsonRpcRequest, JsonRpcResponse};

use crate::adapter::Adapter;
use crate::error::AdapterError;
use crate::model::{MaintenanceOp, RadioMode, RadioState};
use crate::profile::{self, FrequencyProfile};

pub struct VendorHttpAdapter {
    radio_id: String,
    base_url: String,
    client: reqwest::Client,
    /// Cached last successful profile fetch, used to derive channel index
    /// for `get_state` without an extra round trip on every call.
    profile_cache: StdMutex<Vec<FrequencyProfile>>,
}

impl VendorHttpAdapter {
    pub fn new(radio_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        Self {
            radio_id: radio_id.into(),
            base_url: base_url.into(),
            client,
            profile_cache: StdMutex::new(Vec::new()),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, AdapterError> {
        let req = JsonRpcRequest::new(method, params, json!(1));
        let url = format!("{}/streamscape_api", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|_| AdapterError::Cancelled)?;
        let body: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|_| AdapterError::vendor("INTERNAL"))?;
        if let Some(err) = body.error {
            return Err(AdapterError::vendor(err.message));
        }
        body.result.ok_or_else(|| AdapterError::vendor("INTERNAL"))
    }

    fn first_element(value: Value) -> Result<Value, AdapterError> {
        match value {
            Value::Array(mut items) if !items.is_empty() => Ok(items.remove(0)),
            _ => Err(AdapterError::vendor("INTERNAL")),
        }
    }
}

#[async_trait]
impl Adapter for VendorHttpAdapter {
    fn radio_id(&self) -> &str {
        &self.radio_id
    }

    async fn get_state(&self) -> Result<RadioState, AdapterError> {
        let freq = self.read_frequency().await?;
        let power = self.read_power_actual().await?;
        let profiles = self.profile_cache.lock().unwrap().clone();
        let channel_index = profile::derive_channel_index(&profiles, freq);
        Ok(RadioState {
            power_dbm: power,
            frequency_mhz: freq,
            channel_index,
            blackout_until_ms: 0,
            mode: RadioMode::Ready,
        })
    }

    async fn set_power(&self, dbm: f64) -> Result<(), AdapterError> {
        self.call("power_dBm", json!([dbm])).await.map(|_| ())
    }

    async fn set_frequency(&self, mhz: f64) -> Result<(), AdapterError> {
        self.call("freq", json!([mhz])).await.map(|_| ())
    }

    async fn read_power_actual(&self) -> Result<f64, AdapterError> {
        let result = self.call("power_dBm", json!([])).await?;
        let first = Self::first_element(result)?;
        first.as_f64().ok_or_else(|| AdapterError::vendor("INTERNAL"))
    }

    async fn supported_frequency_profiles(&self) -> Result<Vec<FrequencyProfile>, AdapterError> {
        let result = self.call("supported_frequency_profiles", json!([])).await?;
        let first = Self::first_element(result)?;
        let profiles: Vec<FrequencyProfile> =
            serde_json::from_value(first).map_err(|_| AdapterError::vendor("INTERNAL"))?;
        *self.profile_cache.lock().unwrap() = profiles.clone();
        Ok(profiles)
    }

    async fn maintenance(&self, _op: MaintenanceOp) -> Result<(), AdapterError> {
        // Maintenance lives on the TCP port, not the JSON-RPC/HTTP surface
        // (spec §4.7); the northbound HTTP/JSON API does not expose a path
        // for it, so no caller reaches this today.
        Err(AdapterError::vendor("UNAVAILABLE"))
    }
}

impl VendorHttpAdapter {
    async fn read_frequency(&self) -> Result<f64, AdapterError> {
        let result = self.call("freq", json!([])).await?;
        let first = Self::first_element(result)?;
        first.as_f64().ok_or_else(|| AdapterError::vendor("INTERNAL"))
    }
}

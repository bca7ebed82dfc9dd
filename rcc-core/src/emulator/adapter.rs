//! [`Adapter`] implementation that drives an in-process
//! [`EmulatorDevice`] directly, with no network hop. Used for local
//! development and as the default device in tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::AdapterError;
use crate::model::{MaintenanceOp, RadioState};
use crate::profile::FrequencyProfile;

use super::device::EmulatorDevice;

pub struct InProcessAdapter {
    device: Arc<EmulatorDevice>,
}

impl InProcessAdapter {
    pub fn new(device: Arc<EmulatorDevice>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl Adapter for InProcessAdapter {
    fn radio_id(&self) -> &str {
        self.device.radio_id()
    }

    async fn get_state(&self) -> Result<RadioState, AdapterError> {
        self.device.get_state().await
    }

    async fn set_power(&self, dbm: f64) -> Result<(), AdapterError> {
        self.device.set_power(dbm).await
    }

    async fn set_frequency(&self, mhz: f64) -> Result<(), AdapterError> {
        self.device.set_frequency(mhz).await
    }

    async fn read_power_actual(&self) -> Result<f64, AdapterError> {
        self.device.read_power_actual().await
    }

    async fn supported_frequency_profiles(&self) -> Result<Vec<FrequencyProfile>, AdapterError> {
        self.device.supported_frequency_profiles().await
    }

    async fn maintenance(&self, op: MaintenanceOp) -> Result<(), AdapterError> {
        self.device.maintenance(op).await
    }
}

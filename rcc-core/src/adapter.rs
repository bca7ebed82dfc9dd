//! The Radio Adapter contract (spec §4.1).
//!
//! Every device family — the in-process emulator, a JSON-RPC client talking
//! to the standalone vendor emulator, or a future real vendor driver —
//! implements this trait. The Radio Manager and Command Orchestrator never
//! see anything narrower than this interface.
//!
//! Every method accepts an already-running deadline race at the call site
//! (see [`crate::deadline::with_deadline`]); the adapter itself only needs to
//! be safe to drop mid-await, which is true of any `async fn` that does not
//! hold a blocking lock across an `.await`.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::model::{MaintenanceOp, RadioState};
use crate::profile::FrequencyProfile;

#[async_trait]
pub trait Adapter: Send + Sync {
    fn radio_id(&self) -> &str;

    async fn get_state(&self) -> Result<RadioState, AdapterError>;

    async fn set_power(&self, dbm: f64) -> Result<(), AdapterError>;

    async fn set_frequency(&self, mhz: f64) -> Result<(), AdapterError>;

    async fn read_power_actual(&self) -> Result<f64, AdapterError>;

    async fn supported_frequency_profiles(&self) -> Result<Vec<FrequencyProfile>, AdapterError>;

    /// Optional: not every adapter backs a device that accepts maintenance
    /// operations (spec §4.1). The default rejects with `UNAVAILABLE` so the
    /// Normalizer's behavior is well-defined even for adapters that never
    /// override it.
    async fn maintenance(&self, _op: MaintenanceOp) -> Result<(), AdapterError> {
        Err(AdapterError::vendor("UNAVAILABLE"))
    }
}

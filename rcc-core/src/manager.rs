//! Radio Manager: inventory of `{radioId → adapter, capabilities}` plus
//! active-radio selection (spec §4.2).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::adapter::Adapter;
use crate::deadline::with_deadline;
use crate::error::AdapterError;
use crate::model::{RadioStatus, RadioSummary};
use crate::profile::FrequencyProfile;

pub struct RadioEntry {
    pub adapter: Arc<dyn Adapter>,
    pub capabilities: Vec<FrequencyProfile>,
    pub model: String,
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum ManagerError {
    #[error("radio not found")]
    NotFound,
    #[error("adapter unavailable while loading capabilities")]
    LoadUnavailable,
}

#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub active_radio_id: Option<String>,
    pub radios: Vec<RadioSummary>,
}

/// Invariants: `active_radio_id` is either `None` or a key of `radios`;
/// inventory is append-only within a process lifetime unless an explicit
/// unload is requested (spec §4.2).
pub struct RadioManager {
    radios: RwLock<HashMap<String, RadioEntry>>,
    active_radio_id: RwLock<Option<String>>,
}

impl Default for RadioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioManager {
    pub fn new() -> Self {
        Self {
            radios: RwLock::new(HashMap::new()),
            active_radio_id: RwLock::new(None),
        }
    }

    /// Invokes `supportedFrequencyProfiles` under `capability_deadline`; on
    /// success caches the profiles, on failure leaves the inventory
    /// unchanged and yields `UNAVAILABLE` via [`ManagerError::LoadUnavailable`].
    pub async fn load(
        &self,
        radio_id: String,
        model: String,
        adapter: Arc<dyn Adapter>,
        capability_deadline: Duration,
    ) -> Result<(), ManagerError> {
        let profiles = with_deadline(capability_deadline, async {
            adapter.supported_frequency_profiles().await
        })
        .await
        .map_err(|_: AdapterError| ManagerError::LoadUnavailable)?;

        let mut radios = self.radios.write().await;
        radios.insert(
            radio_id,
            RadioEntry {
                adapter,
                capabilities: profiles,
                model,
            },
        );
        Ok(())
    }

    pub async fn unload(&self, radio_id: &str) {
        let mut radios = self.radios.write().await;
        radios.remove(radio_id);
        let mut active = self.active_radio_id.write().await;
        if active.as_deref() == Some(radio_id) {
            *active = None;
        }
    }

    pub async fn resolve(&self, radio_id: &str) -> Result<Arc<dyn Adapter>, ManagerError> {
        let radios = self.radios.read().await;
        radios
            .get(radio_id)
            .map(|e| e.adapter.clone())
            .ok_or(ManagerError::NotFound)
    }

    pub async fn capabilities(&self, radio_id: &str) -> Result<Vec<FrequencyProfile>, ManagerError> {
        let radios = self.radios.read().await;
        radios
            .get(radio_id)
            .map(|e| e.capabilities.clone())
            .ok_or(ManagerError::NotFound)
    }

    pub async fn select_active(&self, radio_id: &str) -> Result<(), ManagerError> {
        let radios = self.radios.read().await;
        if !radios.contains_key(radio_id) {
            return Err(ManagerError::NotFound);
        }
        drop(radios);
        let mut active = self.active_radio_id.write().await;
        *active = Some(radio_id.to_string());
        Ok(())
    }

    pub async fn active_radio_id(&self) -> Option<String> {
        self.active_radio_id.read().await.clone()
    }

    /// `{activeRadioId, radios[]}` — an immutable snapshot (spec §4.2 `list`).
    /// Per-radio status is best-effort: a `getState` call that errors out is
    /// reported `degraded` rather than failing the whole listing.
    pub async fn list(&self) -> InventorySnapshot {
        let radios = self.radios.read().await;
        let mut summaries = Vec::with_capacity(radios.len());
        for (id, entry) in radios.iter() {
            let status = match entry.adapter.get_state().await {
                Ok(_) => RadioStatus::Online,
                Err(_) => RadioStatus::Degraded,
            };
            summaries.push(RadioSummary {
                id: id.clone(),
                model: entry.model.clone(),
                status,
            });
        }
        InventorySnapshot {
            active_radio_id: self.active_radio_id.read().await.clone(),
            radios: summaries,
        }
    }

    pub async fn get_summary(&self, radio_id: &str) -> Result<RadioSummary, ManagerError> {
        let radios = self.radios.read().await;
        let entry = radios.get(radio_id).ok_or(ManagerError::NotFound)?;
        let status = match entry.adapter.get_state().await {
            Ok(_) => RadioStatus::Online,
            Err(_) => RadioStatus::Degraded,
        };
        Ok(RadioSummary {
            id: radio_id.to_string(),
            model: entry.model.clone(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{adapter::InProcessAdapter, device::EmulatorConfig, EmulatorDevice};
    use crate::profile::FrequencyEntry;

    fn test_device(radio_id: &str) -> Arc<dyn Adapter> {
        let config = EmulatorConfig {
            min_dbm: 0.0,
            max_dbm: 39.0,
            soft_boot: Duration::from_millis(5),
            power_change: Duration::from_millis(5),
            radio_reset: Duration::from_millis(5),
            profiles: vec![FrequencyProfile {
                frequencies: vec![FrequencyEntry::Scalar(915.0)],
                bandwidth_mhz: 1.0,
                antenna_mask: 1,
            }],
            default_power_dbm: 10.0,
            default_frequency_mhz: 915.0,
        };
        Arc::new(InProcessAdapter::new(Arc::new(EmulatorDevice::new(
            radio_id, config,
        ))))
    }

    #[tokio::test]
    async fn load_then_resolve_round_trips() {
        let mgr = RadioManager::new();
        mgr.load(
            "r1".into(),
            "silvus".into(),
            test_device("r1"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert!(mgr.resolve("r1").await.is_ok());
        assert!(mgr.resolve("missing").await.is_err());
    }

    #[tokio::test]
    async fn select_active_requires_presence() {
        let mgr = RadioManager::new();
        assert!(matches!(
            mgr.select_active("ghost").await,
            Err(ManagerError::NotFound)
        ));
        mgr.load(
            "r1".into(),
            "silvus".into(),
            test_device("r1"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        mgr.select_active("r1").await.unwrap();
        assert_eq!(mgr.active_radio_id().await, Some("r1".to_string()));
    }

    #[tokio::test]
    async fn cross_radio_independence() {
        let mgr = RadioManager::new();
        mgr.load(
            "a".into(),
            "m".into(),
            test_device("a"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        mgr.load(
            "b".into(),
            "m".into(),
            test_device("b"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        let a = mgr.resolve("a").await.unwrap();
        a.set_power(20.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let b = mgr.resolve("b").await.unwrap();
        let b_state = b.get_state().await.unwrap();
        assert_eq!(b_state.power_dbm, 10.0);
    }
}

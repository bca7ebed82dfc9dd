//! Configuration: recognized keys, defaults, environment overrides and
//! start-up validation (spec §6). File/CLI loading plumbing itself is named
//! out of scope (spec §1); what lives here is the shape of the
//! configuration, its defaults, and the validation every deployment needs
//! regardless of how the bytes arrived.

use std::path::Path;
use std::time::Duration;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::FrequencyProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorMode {
    Normal,
    Degraded,
    Offline,
}

impl Default for OperatorMode {
    fn default() -> Self {
        OperatorMode::Normal
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub http_port: u16,
    pub maintenance_port: u16,
    pub maintenance_allowed_cidrs: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            maintenance_port: 8081,
            maintenance_allowed_cidrs: vec!["127.0.0.1/32".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerConfig {
    pub min_dbm: f64,
    pub max_dbm: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            min_dbm: 0.0,
            max_dbm: 39.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct BlackoutConfig {
    pub soft_boot_sec: u64,
    pub power_change_sec: u64,
    pub radio_reset_sec: u64,
}

impl Default for BlackoutConfig {
    fn default() -> Self {
        Self {
            soft_boot_sec: 30,
            power_change_sec: 5,
            radio_reset_sec: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandTimeouts {
    pub set_power_sec: u64,
    pub set_channel_sec: u64,
    pub select_radio_sec: u64,
    pub read_sec: u64,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            set_power_sec: 10,
            set_channel_sec: 30,
            select_radio_sec: 5,
            read_sec: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatTiming {
    pub interval_sec: u64,
    pub jitter_sec: u64,
    pub timeout_sec: u64,
}

impl Default for HeartbeatTiming {
    fn default() -> Self {
        Self {
            interval_sec: 15,
            jitter_sec: 2,
            timeout_sec: 45,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub blackout: BlackoutConfig,
    pub commands: CommandTimeouts,
    pub heartbeat: HeartbeatTiming,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            blackout: BlackoutConfig::default(),
            commands: CommandTimeouts::default(),
            heartbeat: HeartbeatTiming::default(),
        }
    }
}

/// A statically configured vendor device the gateway loads at start-up
/// (spec.md names automatic discovery out of scope; static configuration is
/// the remaining way radios enter the inventory).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RadioConfig {
    pub id: String,
    pub model: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub profiles: Vec<FrequencyProfile>,
    pub power: PowerConfig,
    pub timing: TimingConfig,
    pub mode: OperatorMode,
    pub radios: Vec<RadioConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.display().to_string(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: p.display().to_string(),
                    source,
                })?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.network.http_port =
            env_u16("RCC_NETWORK_HTTP_PORT", self.network.http_port);
        self.network.maintenance_port =
            env_u16("RCC_NETWORK_MAINTENANCE_PORT", self.network.maintenance_port);
        if let Ok(raw) = std::env::var("RCC_NETWORK_MAINTENANCE_ALLOWED_CIDRS") {
            self.network.maintenance_allowed_cidrs =
                raw.split(',').map(|s| s.trim().to_string()).collect();
        }
        self.power.min_dbm = env_f64("RCC_POWER_MIN_DBM", self.power.min_dbm);
        self.power.max_dbm = env_f64("RCC_POWER_MAX_DBM", self.power.max_dbm);
        self.timing.blackout.soft_boot_sec = env_u64(
            "RCC_TIMING_BLACKOUT_SOFT_BOOT_SEC",
            self.timing.blackout.soft_boot_sec,
        );
        self.timing.blackout.power_change_sec = env_u64(
            "RCC_TIMING_BLACKOUT_POWER_CHANGE_SEC",
            self.timing.blackout.power_change_sec,
        );
        self.timing.blackout.radio_reset_sec = env_u64(
            "RCC_TIMING_BLACKOUT_RADIO_RESET_SEC",
            self.timing.blackout.radio_reset_sec,
        );
        self.timing.commands.set_power_sec = env_u64(
            "RCC_TIMING_COMMANDS_SET_POWER_TIMEOUT_SEC",
            self.timing.commands.set_power_sec,
        );
        self.timing.commands.set_channel_sec = env_u64(
            "RCC_TIMING_COMMANDS_SET_CHANNEL_TIMEOUT_SEC",
            self.timing.commands.set_channel_sec,
        );
        self.timing.commands.select_radio_sec = env_u64(
            "RCC_TIMING_COMMANDS_SELECT_RADIO_TIMEOUT_SEC",
            self.timing.commands.select_radio_sec,
        );
        self.timing.commands.read_sec = env_u64(
            "RCC_TIMING_COMMANDS_READ_TIMEOUT_SEC",
            self.timing.commands.read_sec,
        );
        self.timing.heartbeat.interval_sec = env_u64(
            "RCC_TIMING_HEARTBEAT_INTERVAL_SEC",
            self.timing.heartbeat.interval_sec,
        );
        self.timing.heartbeat.jitter_sec = env_u64(
            "RCC_TIMING_HEARTBEAT_JITTER_SEC",
            self.timing.heartbeat.jitter_sec,
        );
        self.timing.heartbeat.timeout_sec = env_u64(
            "RCC_TIMING_HEARTBEAT_TIMEOUT_SEC",
            self.timing.heartbeat.timeout_sec,
        );
        if let Ok(raw) = std::env::var("RCC_MODE") {
            self.mode = match raw.to_lowercase().as_str() {
                "normal" => OperatorMode::Normal,
                "degraded" => OperatorMode::Degraded,
                "offline" => OperatorMode::Offline,
                _ => self.mode,
            };
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.power.min_dbm > self.power.max_dbm {
            return Err(ConfigError::Invalid(format!(
                "power.minDbm ({}) must be <= power.maxDbm ({})",
                self.power.min_dbm, self.power.max_dbm
            )));
        }
        if self.network.http_port == 0 {
            return Err(ConfigError::Invalid("network.http.port must be nonzero".into()));
        }
        if self.network.maintenance_port == 0 {
            return Err(ConfigError::Invalid(
                "network.maintenance.port must be nonzero".into(),
            ));
        }
        for raw in &self.network.maintenance_allowed_cidrs {
            raw.parse::<IpNet>().map_err(|_| {
                ConfigError::Invalid(format!("invalid CIDR in allowed list: {raw}"))
            })?;
        }
        for profile in &self.profiles {
            for entry in &profile.frequencies {
                if let crate::profile::FrequencyEntry::Range { step, start, end } = entry {
                    if *step <= 0.0 {
                        return Err(ConfigError::Invalid(
                            "frequency range step must be > 0".into(),
                        ));
                    }
                    if start > end {
                        return Err(ConfigError::Invalid(
                            "frequency range start must be <= end".into(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn allowed_cidrs(&self) -> Vec<IpNet> {
        self.network
            .maintenance_allowed_cidrs
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    pub fn set_power_deadline(&self) -> Duration {
        Duration::from_secs(self.timing.commands.set_power_sec)
    }
    pub fn set_channel_deadline(&self) -> Duration {
        Duration::from_secs(self.timing.commands.set_channel_sec)
    }
    pub fn select_radio_deadline(&self) -> Duration {
        Duration::from_secs(self.timing.commands.select_radio_sec)
    }
    pub fn read_deadline(&self) -> Duration {
        Duration::from_secs(self.timing.commands.read_sec)
    }
}

fn env_u16(name: &str, default: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.power.min_dbm, 0.0);
        assert_eq!(c.power.max_dbm, 39.0);
        assert_eq!(c.timing.blackout.soft_boot_sec, 30);
        assert_eq!(c.timing.blackout.power_change_sec, 5);
        assert_eq!(c.timing.blackout.radio_reset_sec, 60);
        assert_eq!(c.timing.commands.set_power_sec, 10);
        assert_eq!(c.timing.commands.set_channel_sec, 30);
        assert_eq!(c.timing.commands.select_radio_sec, 5);
        assert_eq!(c.timing.commands.read_sec, 5);
        assert_eq!(c.timing.heartbeat.interval_sec, 15);
        assert_eq!(c.timing.heartbeat.jitter_sec, 2);
        assert_eq!(c.timing.heartbeat.timeout_sec, 45);
    }

    #[test]
    fn rejects_inverted_power_range() {
        let mut c = Config::default();
        c.power.min_dbm = 40.0;
        c.power.max_dbm = 10.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_cidr() {
        let mut c = Config::default();
        c.network.maintenance_allowed_cidrs = vec!["not-a-cidr".into()];
        assert!(c.validate().is_err());
    }
}

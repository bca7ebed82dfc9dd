//! Frequency profile wire types (spec §3).
//!
//! A profile entry is either a single scalar frequency, or a `start:step:end`
//! arithmetic progression. Matching rules live in `rcc-core` (this crate only
//! carries the shape so the emulator and gateway agree on it byte-for-byte).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrequencyEntry {
    Scalar(f64),
    Range {
        start: f64,
        step: f64,
        end: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyProfile {
    pub frequencies: Vec<FrequencyEntry>,
    #[serde(rename = "bandwidthMhz")]
    pub bandwidth_mhz: f64,
    #[serde(rename = "antennaMask", default)]
    pub antenna_mask: u32,
}

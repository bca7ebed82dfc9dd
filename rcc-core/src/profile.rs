//! Frequency profile matching rules (spec §3).
//!
//! A frequency matches a profile iff it is any scalar entry, lies exactly on
//! the grid of a `start:step:end` triple, or lies within `[start, end]`
//! inclusive when the triple is read as a continuous tunable range — we
//! treat "on the grid" and "within range" as the same test: if `step > 0`
//! the whole `[start, end]` range is accepted (the source emulator does not
//! distinguish a discrete channel plan from a continuous range at the
//! frequency-acceptance boundary; channel derivation, separately, only
//! matches grid points exactly).

pub use rcc_proto::{FrequencyEntry, FrequencyProfile};

const EPSILON: f64 = 1e-6;

/// Does `mhz` match at least one entry of `profile`?
pub fn matches(profile: &FrequencyProfile, mhz: f64) -> bool {
    profile.frequencies.iter().any(|e| entry_matches(e, mhz))
}

pub fn matches_any(profiles: &[FrequencyProfile], mhz: f64) -> bool {
    profiles.iter().any(|p| matches(p, mhz))
}

fn entry_matches(entry: &FrequencyEntry, mhz: f64) -> bool {
    match entry {
        FrequencyEntry::Scalar(v) => (v - mhz).abs() < EPSILON,
        FrequencyEntry::Range { start, end, .. } => {
            mhz >= start - EPSILON && mhz <= end + EPSILON
        }
    }
}

/// Derive the channel index for `mhz` by exact match against the configured
/// plan. Returns `0` ("unknown") when no grid point matches exactly — the
/// frequency itself remains authoritative (spec §4.1.a).
pub fn derive_channel_index(profiles: &[FrequencyProfile], mhz: f64) -> u32 {
    let mut index = 1u32;
    for profile in profiles {
        for entry in &profile.frequencies {
            match entry {
                FrequencyEntry::Scalar(v) => {
                    if (v - mhz).abs() < EPSILON {
                        return index;
                    }
                    index += 1;
                }
                FrequencyEntry::Range { start, step, end } => {
                    if *step <= 0.0 {
                        continue;
                    }
                    let mut grid = *start;
                    while grid <= end + EPSILON {
                        if (grid - mhz).abs() < EPSILON {
                            return index;
                        }
                        index += 1;
                        grid += step;
                    }
                }
            }
        }
    }
    0
}

/// Resolve a channel index to its frequency, for `POST /channel
/// {channelIndex}` requests. Same enumeration order as
/// [`derive_channel_index`].
pub fn frequency_for_channel(profiles: &[FrequencyProfile], channel_index: u32) -> Option<f64> {
    if channel_index == 0 {
        return None;
    }
    let mut index = 1u32;
    for profile in profiles {
        for entry in &profile.frequencies {
            match entry {
                FrequencyEntry::Scalar(v) => {
                    if index == channel_index {
                        return Some(*v);
                    }
                    index += 1;
                }
                FrequencyEntry::Range { start, step, end } => {
                    if *step <= 0.0 {
                        continue;
                    }
                    let mut grid = *start;
                    while grid <= end + EPSILON {
                        if index == channel_index {
                            return Some(grid);
                        }
                        index += 1;
                        grid += step;
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Vec<FrequencyProfile> {
        vec![FrequencyProfile {
            frequencies: vec![FrequencyEntry::Range {
                start: 2412.0,
                step: 5.0,
                end: 2472.0,
            }],
            bandwidth_mhz: 20.0,
            antenna_mask: 0b11,
        }]
    }

    #[test]
    fn grid_point_matches_and_resolves_channel() {
        let profiles = plan();
        assert!(matches_any(&profiles, 2437.0));
        assert_eq!(derive_channel_index(&profiles, 2437.0), 6);
        assert_eq!(frequency_for_channel(&profiles, 6), Some(2437.0));
    }

    #[test]
    fn off_grid_frequency_within_range_matches_but_channel_is_unknown() {
        let profiles = plan();
        assert!(matches_any(&profiles, 2438.2));
        assert_eq!(derive_channel_index(&profiles, 2438.2), 0);
    }

    #[test]
    fn out_of_range_frequency_does_not_match() {
        let profiles = plan();
        assert!(!matches_any(&profiles, 5180.0));
    }

    #[test]
    fn scalar_entry_matches_exactly() {
        let profiles = vec![FrequencyProfile {
            frequencies: vec![FrequencyEntry::Scalar(915.0)],
            bandwidth_mhz: 1.0,
            antenna_mask: 1,
        }];
        assert!(matches_any(&profiles, 915.0));
        assert!(!matches_any(&profiles, 915.5));
        assert_eq!(derive_channel_index(&profiles, 915.0), 1);
    }
}

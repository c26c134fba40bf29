use serde::{Deserialize, Serialize};

/// ECAN tuning. None of these values is normative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcanConfig {
    /// Fixed sti supply.
    pub total_sti: f64,
    /// Fixed lti supply.
    pub total_lti: f64,
    /// Atoms below this sti (and below `minimum_lti`) may be forgotten.
    pub minimum_sti: f64,
    pub minimum_lti: f64,
    /// Only atoms with sti strictly above this spread.
    pub spread_threshold: f64,
    /// Fraction of a sender's sti spread per cycle.
    pub spread_factor: f64,
    /// Sti rent per unit of lti per cycle.
    pub rent_rate: f64,
    /// Lti granted per unit of sti stimulus.
    pub lti_wage: f64,
    /// Incoming links at or above this confidence protect an atom from `forget`.
    pub forget_guard_confidence: f64,
    /// Upper bound on atoms removed by one `forget`.
    pub max_forget_per_cycle: usize,
}

impl Default for EcanConfig {
    fn default() -> Self {
        Self {
            total_sti: 10_000.0,
            total_lti: 10_000.0,
            minimum_sti: 1.0,
            minimum_lti: 1.0,
            spread_threshold: 0.0,
            spread_factor: 0.2,
            rent_rate: 0.01,
            lti_wage: 0.1,
            forget_guard_confidence: 0.9,
            max_forget_per_cycle: usize::MAX,
        }
    }
}

impl EcanConfig {
    /// Tight funds and bounded forgetting, for small embedded knowledge bases.
    pub fn small() -> Self {
        Self {
            total_sti: 1_000.0,
            total_lti: 1_000.0,
            max_forget_per_cycle: 64,
            ..Default::default()
        }
    }

    /// Large funds for knowledge bases with many active atoms.
    pub fn large() -> Self {
        Self {
            total_sti: 1_000_000.0,
            total_lti: 1_000_000.0,
            max_forget_per_cycle: 10_000,
            ..Default::default()
        }
    }
}

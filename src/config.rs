//! Engine configuration.
//!
//! ```text
//! CogConfig::default() / small() / large()
//!        │
//!        ├── from_json(doc)   partial documents fill from defaults
//!        └── from_env()       COGSPACE_* overlay
//! ```

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::attention::EcanConfig;
use crate::cache::CacheConfig;
use crate::reasoning::ReasonerConfig;
use crate::{Error, Result};

/// Aggregate configuration for a [`CogEngine`](crate::CogEngine).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CogConfig {
    pub ecan: EcanConfig,
    pub cache: CacheConfig,
    pub reasoner: ReasonerConfig,
}

impl CogConfig {
    /// Small funds, small cache, unguided reasoning.
    pub fn small() -> Self {
        Self {
            ecan: EcanConfig::small(),
            cache: CacheConfig::small(),
            reasoner: ReasonerConfig {
                max_steps: 5,
                ..Default::default()
            },
        }
    }

    /// Large funds and cache, focus-guided reasoning with a time budget.
    pub fn large() -> Self {
        Self {
            ecan: EcanConfig::large(),
            cache: CacheConfig::large(),
            reasoner: ReasonerConfig {
                max_steps: 50,
                focus_size: Some(256),
                time_limit: Some(Duration::from_secs(5)),
                backward_max_depth: 5,
                backward_branching: 16,
                ..Default::default()
            },
        }
    }

    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(doc: &str) -> Result<Self> {
        let config: CogConfig = serde_json::from_str(doc)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Preset named by `COGSPACE_PRESET` (`small`, `large`, default otherwise)
    /// with the `COGSPACE_*` overlay applied.
    pub fn from_env() -> Self {
        let base = match env::var("COGSPACE_PRESET").as_deref() {
            Ok("small") => Self::small(),
            Ok("large") => Self::large(),
            _ => Self::default(),
        };
        base.overlay(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Unparseable values are ignored.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `COGSPACE_TOTAL_STI` | `ecan.total_sti` |
    /// | `COGSPACE_TOTAL_LTI` | `ecan.total_lti` |
    /// | `COGSPACE_RENT_RATE` | `ecan.rent_rate` |
    /// | `COGSPACE_SPREAD_FACTOR` | `ecan.spread_factor` |
    /// | `COGSPACE_CACHE_MAX_SIZE` | `cache.max_size` |
    /// | `COGSPACE_CACHE_TTL_SECS` | `cache.ttl` (0 disables) |
    /// | `COGSPACE_MAX_STEPS` | `reasoner.max_steps` |
    /// | `COGSPACE_FOCUS_SIZE` | `reasoner.focus_size` (0 disables) |
    /// | `COGSPACE_SEED` | `reasoner.seed` |
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &str,
        ) -> Option<T> {
            lookup(name).and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parsed(&lookup, "COGSPACE_TOTAL_STI") {
            self.ecan.total_sti = v;
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_TOTAL_LTI") {
            self.ecan.total_lti = v;
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_RENT_RATE") {
            self.ecan.rent_rate = v;
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_SPREAD_FACTOR") {
            self.ecan.spread_factor = v;
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_CACHE_MAX_SIZE") {
            self.cache.max_size = v;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "COGSPACE_CACHE_TTL_SECS") {
            self.cache.ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_MAX_STEPS") {
            self.reasoner.max_steps = v;
        }
        if let Some(k) = parsed::<usize>(&lookup, "COGSPACE_FOCUS_SIZE") {
            self.reasoner.focus_size = (k > 0).then_some(k);
        }
        if let Some(v) = parsed(&lookup, "COGSPACE_SEED") {
            self.reasoner.seed = v;
        }
        self
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        let ecan = &self.ecan;
        if !(ecan.total_sti >= 0.0) || !(ecan.total_lti >= 0.0) {
            return Err(Error::Config("attention totals must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&ecan.spread_factor) {
            return Err(Error::Config(format!(
                "spread_factor {} outside [0, 1]",
                ecan.spread_factor
            )));
        }
        if !(ecan.rent_rate >= 0.0) || !(ecan.lti_wage >= 0.0) {
            return Err(Error::Config("rent_rate and lti_wage must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.cache.evict_fraction) {
            return Err(Error::Config(format!(
                "evict_fraction {} outside [0, 1]",
                self.cache.evict_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.reasoner.min_confidence) {
            return Err(Error::Config(format!(
                "min_confidence {} outside [0, 1]",
                self.reasoner.min_confidence
            )));
        }
        Ok(())
    }
}

//! Truth values: <strength, confidence>
//!
//! Pure arithmetic with no I/O or storage dependencies. The inference rules that
//! combine truth values live in the main crate's `pln` module; this module only
//! owns the representation and the evidence-count conversions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default evidential horizon `k` used by the count/confidence conversions.
pub const DEFAULT_K: f64 = 800.0;

/// Clamp into [0, 1]. NaN maps to 0.
#[inline]
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Probabilistic truth value: <strength, confidence>
///
/// - **strength** (s): probability estimate (0.0 - 1.0)
/// - **confidence** (c): how much evidence backs the estimate (0.0 - 1.0)
///
/// Confidence maps to an evidence count `n = k·c / (1 − c)`; `c = 1` is
/// infinite evidence.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    pub strength: f64,
    pub confidence: f64,
}

impl TruthValue {
    /// Build a truth value, clamping both fields into [0, 1].
    pub fn new(strength: f64, confidence: f64) -> Self {
        #[cfg(feature = "strict-truth")]
        {
            debug_assert!(
                (0.0..=1.0).contains(&strength),
                "strength out of range: {strength}"
            );
            debug_assert!(
                (0.0..=1.0).contains(&confidence),
                "confidence out of range: {confidence}"
            );
        }
        Self {
            strength: clamp_unit(strength),
            confidence: clamp_unit(confidence),
        }
    }

    /// No evidence at all: <0, 0>. Also the value of revising an empty list.
    pub const fn null() -> Self {
        Self {
            strength: 0.0,
            confidence: 0.0,
        }
    }

    /// Default for freshly created atoms: <1, 0>.
    pub const fn default_tv() -> Self {
        Self {
            strength: 1.0,
            confidence: 0.0,
        }
    }

    /// Certain true: <1.0, 0.9>
    pub fn certain_true() -> Self {
        Self::new(1.0, 0.9)
    }

    /// Certain false: <0.0, 0.9>
    pub fn certain_false() -> Self {
        Self::new(0.0, 0.9)
    }

    /// Re-clamp fields that may have been written directly.
    pub fn clamped(self) -> Self {
        Self {
            strength: clamp_unit(self.strength),
            confidence: clamp_unit(self.confidence),
        }
    }

    /// Evidence count with the default horizon.
    pub fn count(&self) -> f64 {
        confidence_to_count(self.confidence, DEFAULT_K)
    }

    /// Build from strength and evidence count with the default horizon.
    pub fn from_count(strength: f64, count: f64) -> Self {
        Self::new(strength, count_to_confidence(count, DEFAULT_K))
    }

    /// Expected value (decision-making utility).
    ///
    /// e = c * (s - 0.5) + 0.5
    pub fn expectation(&self) -> f64 {
        self.confidence * (self.strength - 0.5) + 0.5
    }

    /// Is this highly confident?
    pub fn is_confident(&self) -> bool {
        self.confidence > 0.7
    }

    /// Is there any evidence behind this value?
    pub fn has_evidence(&self) -> bool {
        self.confidence > 0.0
    }
}

/// `n = k·c / (1 − c)`; `c ≥ 1` is infinite evidence.
pub fn confidence_to_count(confidence: f64, k: f64) -> f64 {
    let c = clamp_unit(confidence);
    if c >= 1.0 {
        f64::INFINITY
    } else {
        k * c / (1.0 - c)
    }
}

/// `c = n / (n + k)`; infinite evidence is confidence 1.
pub fn count_to_confidence(count: f64, k: f64) -> f64 {
    if count.is_nan() || count <= 0.0 {
        0.0
    } else if count.is_infinite() {
        1.0
    } else {
        clamp_unit(count / (count + k))
    }
}

impl fmt::Debug for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.3}, {:.3}>", self.strength, self.confidence)
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\u{27E8}{:.0}%, {:.0}%\u{27E9}",
            self.strength * 100.0,
            self.confidence * 100.0
        )
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::default_tv()
    }
}

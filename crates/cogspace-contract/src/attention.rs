//! Attention values: <sti, lti, vlti>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short-term, long-term and very-long-term importance.
///
/// `sti` and `lti` are currencies owned by the attention bank; `vlti` is a
/// flag-like weight: any positive value pins the atom against forgetting.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionValue {
    pub sti: f64,
    pub lti: f64,
    pub vlti: f64,
}

impl AttentionValue {
    pub const fn new(sti: f64, lti: f64, vlti: f64) -> Self {
        Self { sti, lti, vlti }
    }

    pub const fn zero() -> Self {
        Self {
            sti: 0.0,
            lti: 0.0,
            vlti: 0.0,
        }
    }

    /// Pinned atoms are never forgotten.
    pub fn is_pinned(&self) -> bool {
        self.vlti > 0.0
    }
}

impl fmt::Debug for AttentionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[sti={:.2} lti={:.2} vlti={:.2}]", self.sti, self.lti, self.vlti)
    }
}

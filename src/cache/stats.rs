use serde::Serialize;

use crate::atomspace::format_number;

/// Cache counters since creation or the last `reset_stats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub expirations: u64,
    pub size: usize,
}

impl CacheStats {
    /// `hits / max(1, hits + misses)`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = (self.hits + self.misses).max(1);
        self.hits as f64 / lookups as f64
    }

    pub fn to_debug_text(&self) -> String {
        format!(
            "(stats (hits {}) (misses {}) (evictions {}) (invalidations {}) (hit-rate {}))",
            self.hits,
            self.misses,
            self.evictions,
            self.invalidations,
            format_number(self.hit_rate()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_lookups() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_debug_text() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            evictions: 2,
            invalidations: 5,
            expirations: 0,
            size: 7,
        };
        assert_eq!(
            stats.to_debug_text(),
            "(stats (hits 3) (misses 1) (evictions 2) (invalidations 5) (hit-rate 0.75))"
        );
    }
}

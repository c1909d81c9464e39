//! Available memory estimation
//!
//! Three tiers, first applicable wins:
//! 1. `MemAvailable` (kernel 3.14+), used verbatim
//! 2. `MemFree + Buffers + Cached + SReclaimable`
//! 3. `MemFree + Buffers + Cached`

use crate::error::{ProbeError, Result};
use crate::meminfo::MemoryStats;
use crate::verbosity::Verbosity;
use std::fmt;
use tracing::{debug, warn};

/// Which formula produced the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationMethod {
    MemAvailable,
    FreeBuffersCachedReclaimable,
    FreeBuffersCached,
}

impl EstimationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationMethod::MemAvailable => "MemAvailable",
            EstimationMethod::FreeBuffersCachedReclaimable => "MemFree+Buffers+Cached+SReclaimable",
            EstimationMethod::FreeBuffersCached => "MemFree+Buffers+Cached",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated available memory for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityEstimate {
    pub available_kb: u64,
    pub total_kb: u64,
    pub method: EstimationMethod,
    /// Percentage in tenths, truncated: 249 means 24.9%
    per_mille: u64,
}

impl AvailabilityEstimate {
    /// Percentage of total memory available, one decimal, truncated
    pub fn percent_available(&self) -> f64 {
        self.per_mille as f64 / 10.0
    }

    pub fn per_mille(&self) -> u64 {
        self.per_mille
    }

    /// Available memory in whole megabytes
    pub fn available_mb(&self) -> u64 {
        self.available_kb / 1024
    }

    /// Percentage text with exactly one decimal digit
    pub fn percent_text(&self) -> String {
        format!("{}.{}", self.per_mille / 10, self.per_mille % 10)
    }
}

/// Compute the availability estimate for `stats`
pub fn estimate(stats: &MemoryStats, verbosity: Verbosity) -> Result<AvailabilityEstimate> {
    let total_kb = stats.mem_total_kb();
    if total_kb == 0 {
        return Err(ProbeError::InvalidTotal);
    }

    let base_kb = stats
        .mem_free_kb()
        .saturating_add(stats.buffers_kb())
        .saturating_add(stats.cached_kb());

    let (available_kb, method) = match (stats.mem_available_kb(), stats.sreclaimable_kb()) {
        (Some(available), _) => (available, EstimationMethod::MemAvailable),
        (None, Some(reclaimable)) => (
            base_kb.saturating_add(reclaimable),
            EstimationMethod::FreeBuffersCachedReclaimable,
        ),
        (None, None) => (base_kb, EstimationMethod::FreeBuffersCached),
    };

    let per_mille = truncated_per_mille(available_kb, total_kb);

    if verbosity.dumps_fields() {
        debug!(
            method = method.as_str(),
            available_kb,
            total_kb,
            per_mille,
            "estimated available memory"
        );
    }

    Ok(AvailabilityEstimate {
        available_kb,
        total_kb,
        method,
        per_mille,
    })
}

/// floor(available * 1000 / total), capped at 1000
fn truncated_per_mille(available_kb: u64, total_kb: u64) -> u64 {
    let raw = u128::from(available_kb) * 1000 / u128::from(total_kb);
    if raw > 1000 {
        warn!(available_kb, total_kb, "available memory exceeds MemTotal, capping at 100%");
        return 1000;
    }
    raw as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meminfo::{MeminfoField, MeminfoParser};
    use std::collections::BTreeMap;

    fn stats(pairs: &[(MeminfoField, u64)]) -> MemoryStats {
        MemoryStats::from_values(pairs.iter().copied().collect::<BTreeMap<_, _>>()).unwrap()
    }

    fn base() -> Vec<(MeminfoField, u64)> {
        vec![
            (MeminfoField::MemTotal, 10000),
            (MeminfoField::MemFree, 1000),
            (MeminfoField::Buffers, 200),
            (MeminfoField::Cached, 300),
        ]
    }

    #[test]
    fn test_tier_one_mem_available() {
        let mut fields = base();
        fields.push((MeminfoField::MemAvailable, 2500));
        fields.push((MeminfoField::SReclaimable, 100));
        let est = estimate(&stats(&fields), Verbosity::default()).unwrap();
        assert_eq!(est.method, EstimationMethod::MemAvailable);
        assert_eq!(est.available_kb, 2500);
        assert_eq!(est.percent_available(), 25.0);
    }

    #[test]
    fn test_tier_two_sreclaimable() {
        let mut fields = base();
        fields.push((MeminfoField::SReclaimable, 100));
        let est = estimate(&stats(&fields), Verbosity::default()).unwrap();
        assert_eq!(est.method, EstimationMethod::FreeBuffersCachedReclaimable);
        assert_eq!(est.available_kb, 1600);
        assert_eq!(est.percent_available(), 16.0);
    }

    #[test]
    fn test_tier_three_classic_sum() {
        let est = estimate(&stats(&base()), Verbosity::default()).unwrap();
        assert_eq!(est.method, EstimationMethod::FreeBuffersCached);
        assert_eq!(est.available_kb, 1500);
        assert_eq!(est.percent_available(), 15.0);
        assert_eq!(est.percent_text(), "15.0");
    }

    #[test]
    fn test_percentage_truncates() {
        let est = estimate(
            &stats(&[
                (MeminfoField::MemTotal, 10000),
                (MeminfoField::MemFree, 0),
                (MeminfoField::Buffers, 0),
                (MeminfoField::Cached, 0),
                (MeminfoField::MemAvailable, 2496),
            ]),
            Verbosity::default(),
        )
        .unwrap();
        assert_eq!(est.percent_available(), 24.9);
        assert_eq!(est.percent_text(), "24.9");

        let est = estimate(
            &stats(&[
                (MeminfoField::MemTotal, 3),
                (MeminfoField::MemFree, 2),
                (MeminfoField::Buffers, 0),
                (MeminfoField::Cached, 0),
            ]),
            Verbosity::default(),
        )
        .unwrap();
        // 66.666...% truncates to 66.6
        assert_eq!(est.percent_text(), "66.6");
    }

    #[test]
    fn test_zero_total_is_invalid() {
        let err = estimate(
            &stats(&[
                (MeminfoField::MemTotal, 0),
                (MeminfoField::MemFree, 10),
                (MeminfoField::Buffers, 0),
                (MeminfoField::Cached, 0),
            ]),
            Verbosity::default(),
        )
        .unwrap_err();
        assert_eq!(err, ProbeError::InvalidTotal);
    }

    #[test]
    fn test_available_above_total_is_capped() {
        let mut fields = base();
        fields.push((MeminfoField::MemAvailable, 12000));
        let est = estimate(&stats(&fields), Verbosity::default()).unwrap();
        assert_eq!(est.available_kb, 12000);
        assert_eq!(est.percent_text(), "100.0");
    }

    #[test]
    fn test_megabytes_truncate() {
        let text = "MemTotal: 16310196 kB\nMemFree: 1034288 kB\nMemAvailable: 9473788 kB\nBuffers: 512044 kB\nCached: 7530128 kB\n";
        let parsed = MeminfoParser::default().parse_str(text).unwrap();
        let est = estimate(&parsed, Verbosity::new(2)).unwrap();
        assert_eq!(est.available_mb(), 9251);
        assert_eq!(est.percent_text(), "58.0");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{CanonicalRow, Dataset};

// ---------------------------------------------------------------------------
// FrequencyRange – inclusive MHz window
// ---------------------------------------------------------------------------

/// Inclusive `[min_mhz, max_mhz]` window.
///
/// Bounds beyond the data on either side are fine: they simply select
/// everything up to the data's real extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min_mhz: f64,
    pub max_mhz: f64,
}

impl FrequencyRange {
    pub const fn new(min_mhz: f64, max_mhz: f64) -> Self {
        Self { min_mhz, max_mhz }
    }

    pub fn contains(&self, frequency_mhz: f64) -> bool {
        self.min_mhz <= frequency_mhz && frequency_mhz <= self.max_mhz
    }
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self::new(0.0, 100_000.0)
    }
}

impl fmt::Display for FrequencyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}MHz", self.min_mhz, self.max_mhz)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Copy out the rows with `min_mhz <= frequency_mhz <= max_mhz`, in file order.
///
/// An empty result (range outside the data, or `min > max`) is not an error.
pub fn filter_by_frequency(dataset: &Dataset, min_mhz: f64, max_mhz: f64) -> Vec<CanonicalRow> {
    filter_range(dataset, FrequencyRange::new(min_mhz, max_mhz))
}

pub fn filter_range(dataset: &Dataset, range: FrequencyRange) -> Vec<CanonicalRow> {
    let rows: Vec<CanonicalRow> = dataset
        .rows()
        .iter()
        .filter(|row| range.contains(row.frequency_mhz))
        .cloned()
        .collect();

    if rows.is_empty() && !dataset.is_empty() {
        log::warn!(
            "{}: no rows between {} and {} MHz",
            dataset.source(),
            range.min_mhz,
            range.max_mhz
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::data::model::{PortPair, SParam};

    fn dataset(freqs: &[f64]) -> Dataset {
        let rows = freqs
            .iter()
            .map(|&f| CanonicalRow {
                frequency_mhz: f,
                params: BTreeMap::from([(PortPair::new(1, 1), SParam::from_re_im(f / 1e4, 0.0))]),
            })
            .collect();
        Dataset::new("band.s1p", 1, rows)
    }

    fn freqs(rows: &[CanonicalRow]) -> Vec<f64> {
        rows.iter().map(|r| r.frequency_mhz).collect()
    }

    #[test]
    fn inclusive_bounds() {
        let ds = dataset(&[700.0, 800.0, 900.0, 1000.0, 1100.0]);
        let rows = filter_by_frequency(&ds, 800.0, 1000.0);
        assert_eq!(freqs(&rows), vec![800.0, 900.0, 1000.0]);
    }

    #[test]
    fn max_beyond_data_returns_everything_above_min() {
        let ds = dataset(&[700.0, 800.0, 900.0]);
        let rows = filter_by_frequency(&ds, 750.0, 100_000.0);
        assert_eq!(freqs(&rows), vec![800.0, 900.0]);
    }

    #[test]
    fn min_below_data_is_tolerated() {
        let ds = dataset(&[700.0, 800.0, 900.0]);
        let rows = filter_by_frequency(&ds, -1e9, 800.0);
        assert_eq!(freqs(&rows), vec![700.0, 800.0]);
    }

    #[test]
    fn disjoint_range_is_empty_not_an_error() {
        let ds = dataset(&[700.0, 800.0]);
        assert!(filter_by_frequency(&ds, 5000.0, 6000.0).is_empty());
        assert!(filter_by_frequency(&ds, 900.0, 100.0).is_empty());
    }

    #[test]
    fn result_is_an_exact_subsequence() {
        let ds = dataset(&[900.0, 700.0, 1000.0, 800.0]);
        let rows = filter_by_frequency(&ds, 750.0, 950.0);
        assert_eq!(freqs(&rows), vec![900.0, 800.0]);
        assert_eq!(rows[0], ds.rows()[0]);
        assert_eq!(rows[1], ds.rows()[3]);
        // The dataset itself is untouched.
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn default_range_matches_legacy_window() {
        let range = FrequencyRange::default();
        assert_eq!((range.min_mhz, range.max_mhz), (0.0, 100_000.0));
        assert_eq!(range.to_string(), "0-100000MHz");
    }
}

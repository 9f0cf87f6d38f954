//! # Histogram Accumulator
//!
//! Named, fixed-binning weighted histograms. Bins are created once at run
//! start and never resized; values outside `[lo, hi)` land in the
//! underflow/overflow counters and in no bin.

use crate::error::HarnessError;
use crate::HarnessResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weighted 1D histogram with uniform bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub name: String,
    /// Bin edges, `bin_count + 1` of them
    pub edges: Vec<f64>,
    /// Sum of weights per bin
    pub counts: Vec<f64>,
    /// Sum of squared weights per bin
    pub sum_w2: Vec<f64>,
    /// Number of accumulate calls, in range or not
    pub entries: u64,
    /// Sum of weights below `lo`
    pub underflow: f64,
    /// Sum of weights at or above `hi` (and NaN values)
    pub overflow: f64,
    sum_w: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Histogram {
    /// Create a histogram with `bin_count` uniform bins over `[lo, hi)`
    pub fn new(name: &str, bin_count: usize, lo: f64, hi: f64) -> HarnessResult<Self> {
        let invalid = |reason: &str| HarnessError::InvalidHistogram {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if bin_count == 0 {
            return Err(invalid("bin count must be positive"));
        }
        if !lo.is_finite() || !hi.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if lo >= hi {
            return Err(invalid("lower bound must be below upper bound"));
        }

        let step = (hi - lo) / bin_count as f64;
        if !step.is_finite() {
            return Err(invalid("range width overflows"));
        }
        let mut edges: Vec<f64> = (0..=bin_count).map(|i| lo + i as f64 * step).collect();
        edges[bin_count] = hi;

        Ok(Self {
            name: name.to_string(),
            edges,
            counts: vec![0.0; bin_count],
            sum_w2: vec![0.0; bin_count],
            entries: 0,
            underflow: 0.0,
            overflow: 0.0,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wx2: 0.0,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn lower_bound(&self) -> f64 {
        self.edges[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.edges[self.counts.len()]
    }

    /// Add `weight` to the bin containing `value`
    pub fn accumulate(&mut self, value: f64, weight: f64) {
        self.entries += 1;

        if value < self.lower_bound() {
            self.underflow += weight;
            return;
        }
        if value.is_nan() || value >= self.upper_bound() {
            self.overflow += weight;
            return;
        }

        let bin = self.edges.partition_point(|&e| e <= value) - 1;
        let bin = bin.min(self.counts.len() - 1);
        self.counts[bin] += weight;
        self.sum_w2[bin] += weight * weight;

        self.sum_w += weight;
        self.sum_wx += weight * value;
        self.sum_wx2 += weight * value * value;
    }

    /// Unit-weight fill
    pub fn fill(&mut self, value: f64) {
        self.accumulate(value, 1.0);
    }

    /// Sum of in-range weights
    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn bin_content(&self, bin: usize) -> Option<f64> {
        self.counts.get(bin).copied()
    }

    pub fn bin_center(&self, bin: usize) -> Option<f64> {
        if bin < self.counts.len() {
            Some(0.5 * (self.edges[bin] + self.edges[bin + 1]))
        } else {
            None
        }
    }

    /// Statistical error of a bin, sqrt(Σw²)
    pub fn bin_error(&self, bin: usize) -> Option<f64> {
        self.sum_w2.get(bin).map(|w2| w2.sqrt())
    }

    /// Weighted mean of in-range values
    pub fn mean(&self) -> f64 {
        if self.sum_w != 0.0 {
            self.sum_wx / self.sum_w
        } else {
            0.0
        }
    }

    /// Weighted standard deviation of in-range values
    pub fn rms(&self) -> f64 {
        if self.sum_w != 0.0 {
            let mean = self.mean();
            (self.sum_wx2 / self.sum_w - mean * mean).max(0.0).sqrt()
        } else {
            0.0
        }
    }

    /// Bin-by-bin ratio with another histogram of identical binning.
    /// Bins with an empty denominator are zero.
    pub fn divide(&self, denominator: &Histogram, name: &str) -> HarnessResult<Histogram> {
        if self.edges != denominator.edges {
            return Err(HarnessError::InvalidHistogram {
                name: name.to_string(),
                reason: format!(
                    "binning of {} and {} differ",
                    self.name, denominator.name
                ),
            });
        }

        let mut ratio = Histogram::new(name, self.bin_count(), self.lower_bound(), self.upper_bound())?;
        for bin in 0..self.bin_count() {
            let (n, d) = (self.counts[bin], denominator.counts[bin]);
            if d == 0.0 {
                continue;
            }
            let r = n / d;
            ratio.counts[bin] = r;
            // Uncorrelated errors
            let rel2 = if n != 0.0 {
                self.sum_w2[bin] / (n * n) + denominator.sum_w2[bin] / (d * d)
            } else {
                denominator.sum_w2[bin] / (d * d)
            };
            ratio.sum_w2[bin] = r * r * rel2;
            ratio.entries += 1;
        }
        Ok(ratio)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{}: entries={}, integral={:.4}, mean={:.5}, rms={:.5}, under={}, over={}",
            self.name,
            self.entries,
            self.integral(),
            self.mean(),
            self.rms(),
            self.underflow,
            self.overflow
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HISTOGRAM SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Index of a histogram inside a [`HistogramSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistogramId(usize);

/// Named histograms in creation order
#[derive(Debug, Clone, Default)]
pub struct HistogramSet {
    histograms: Vec<Histogram>,
    index: HashMap<String, usize>,
}

impl HistogramSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a histogram; names are unique within a set
    pub fn create(&mut self, name: &str, bin_count: usize, lo: f64, hi: f64) -> HarnessResult<HistogramId> {
        if self.index.contains_key(name) {
            return Err(HarnessError::InvalidHistogram {
                name: name.to_string(),
                reason: "already declared".to_string(),
            });
        }
        let histogram = Histogram::new(name, bin_count, lo, hi)?;
        let id = self.histograms.len();
        self.histograms.push(histogram);
        self.index.insert(name.to_string(), id);
        Ok(HistogramId(id))
    }

    /// Accumulate into a histogram by name
    pub fn accumulate(&mut self, name: &str, value: f64, weight: f64) -> HarnessResult<()> {
        let id = *self
            .index
            .get(name)
            .ok_or_else(|| HarnessError::UnknownHistogram(name.to_string()))?;
        self.histograms[id].accumulate(value, weight);
        Ok(())
    }

    /// Accumulate into a histogram by id, skipping the name lookup
    pub fn accumulate_id(&mut self, id: HistogramId, value: f64, weight: f64) {
        self.histograms[id.0].accumulate(value, weight);
    }

    pub fn get(&self, name: &str) -> Option<&Histogram> {
        self.index.get(name).map(|&i| &self.histograms[i])
    }

    pub fn by_id(&self, id: HistogramId) -> &Histogram {
        &self.histograms[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Histogram> {
        self.histograms.iter()
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Consume the set, keeping creation order
    pub fn into_vec(self) -> Vec<Histogram> {
        self.histograms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_fill() {
        let mut hist = Histogram::new("h", 10, 0.0, 10.0).unwrap();
        for i in 0..100 {
            hist.fill(i as f64 / 10.0);
        }
        assert_eq!(hist.entries, 100);
        assert_eq!(hist.integral(), 100.0);
        assert!(hist.counts.iter().all(|&c| c == 10.0));
        assert!((hist.mean() - 4.95).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_goes_to_flow_bins() {
        let mut hist = Histogram::new("residual", 2000, -0.02, 0.02).unwrap();
        hist.fill(-0.5);
        hist.fill(0.02);
        hist.fill(f64::NAN);
        hist.fill(0.00001);
        assert_eq!(hist.entries, 4);
        assert_eq!(hist.underflow, 1.0);
        assert_eq!(hist.overflow, 2.0);
        assert_eq!(hist.integral(), 1.0);
        assert_eq!(hist.bin_content(1000), Some(1.0));
    }

    #[test]
    fn test_weighted_accumulate() {
        let mut hist = Histogram::new("pz_wpt", 4, -2.0, 2.0).unwrap();
        hist.accumulate(0.5, 0.25);
        hist.accumulate(0.6, 0.75);
        assert_eq!(hist.bin_content(2), Some(1.0));
        assert!((hist.bin_error(2).unwrap() - (0.25f64.powi(2) + 0.75f64.powi(2)).sqrt()).abs() < 1e-12);
        assert!((hist.mean() - 0.575).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_binning() {
        assert!(Histogram::new("a", 0, 0.0, 1.0).is_err());
        assert!(Histogram::new("b", 10, 1.0, 1.0).is_err());
        assert!(Histogram::new("c", 10, 0.0, f64::INFINITY).is_err());
        assert!(Histogram::new("d", 10, -f64::MAX, f64::MAX).is_err());
    }

    #[test]
    fn test_bin_centers_and_edges() {
        let hist = Histogram::new("e", 5, 0.0, 1.1).unwrap();
        assert_eq!(hist.upper_bound(), 1.1);
        assert!((hist.bin_center(0).unwrap() - 0.11).abs() < 1e-12);
        assert_eq!(hist.bin_center(5), None);
    }

    #[test]
    fn test_divide() {
        let mut num = Histogram::new("num", 3, 0.0, 3.0).unwrap();
        let mut den = Histogram::new("den", 3, 0.0, 3.0).unwrap();
        num.accumulate(0.5, 3.0);
        den.fill(0.5);
        den.fill(0.5);
        num.accumulate(1.5, 1.0);

        let ratio = num.divide(&den, "ratio").unwrap();
        assert_eq!(ratio.bin_content(0), Some(1.5));
        // Empty denominator
        assert_eq!(ratio.bin_content(1), Some(0.0));
        assert_eq!(ratio.bin_content(2), Some(0.0));

        let other = Histogram::new("other", 4, 0.0, 3.0).unwrap();
        assert!(matches!(
            num.divide(&other, "bad"),
            Err(HarnessError::InvalidHistogram { .. })
        ));
    }

    #[test]
    fn test_set_by_name() {
        let mut set = HistogramSet::new();
        let id = set.create("E_loss", 500, -1.0, 2.0).unwrap();
        assert!(set.create("E_loss", 10, 0.0, 1.0).is_err());

        set.accumulate("E_loss", 0.5, 1.0).unwrap();
        set.accumulate_id(id, 0.7, 1.0);
        assert_eq!(set.get("E_loss").unwrap().entries, 2);
        assert_eq!(set.by_id(id).integral(), 2.0);
        assert!(matches!(
            set.accumulate("missing", 0.0, 1.0),
            Err(HarnessError::UnknownHistogram(_))
        ));
        assert_eq!(set.len(), 1);
    }
}

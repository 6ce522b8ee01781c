//! Order statistics over present numeric values

use serde::Serialize;

/// Sort ascending; callers only pass finite values.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median that is always an observed value (lower middle for even counts).
pub fn lower_median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted[(sorted.len() - 1) / 2])
}

/// Quantile by linear interpolation between closest ranks (Hyndman-Fan type 7).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let median = lower_median(&sorted)?;
        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            median,
            q1,
            q3,
            iqr: q3 - q1,
            min,
            max,
            mean,
        })
    }

    /// Tukey fences for the given IQR multiplier
    pub fn fences(&self, multiplier: f64) -> (f64, f64) {
        (self.q1 - multiplier * self.iqr, self.q3 + multiplier * self.iqr)
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

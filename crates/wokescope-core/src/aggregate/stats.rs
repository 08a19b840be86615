use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ci95, iter_rows};
use crate::ParsedRow;

/// Per-year score distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStat {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub ci95_low: f64,
    pub ci95_high: f64,
}

/// Linear-interpolated percentile of an ascending slice. Empty input gives 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] + (sorted[upper] - sorted[lower]) * (index - lower as f64)
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (N - 1). Zero for fewer than two values.
pub(crate) fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Population standard deviation (N).
pub(crate) fn population_stdev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Per-year count, mean, percentiles and 95% CI of the scored rows.
pub fn compute_year_stats<R: Borrow<ParsedRow>>(rows: &[R]) -> Vec<YearStat> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for row in iter_rows(rows) {
        if let Some(score) = row.score() {
            by_year.entry(row.year).or_default().push(score);
        }
    }

    by_year
        .into_iter()
        .map(|(year, mut scores)| {
            scores.sort_by(f64::total_cmp);
            let count = scores.len();
            let mean = mean(&scores).unwrap_or(0.0);
            let stdev = sample_stdev(&scores, mean);
            let (ci95_low, ci95_high) = ci95(mean, stdev, count);
            YearStat {
                year,
                count,
                mean,
                median: percentile(&scores, 0.5),
                p25: percentile(&scores, 0.25),
                p75: percentile(&scores, 0.75),
                p90: percentile(&scores, 0.9),
                ci95_low,
                ci95_high,
            }
        })
        .collect()
}

/// Centered moving average whose window shrinks at the edges.
///
/// A window of 0 or 1 returns the input unchanged.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|idx| {
            let start = idx.saturating_sub(half);
            let end = (idx + half).min(values.len() - 1);
            let slice = &values[start..=end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

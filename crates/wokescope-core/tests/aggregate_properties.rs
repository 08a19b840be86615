//! Property-based tests for the aggregation engine.

use proptest::prelude::*;
use wokescope_core::ParsedRow;
use wokescope_core::aggregate::{compute_journal_trend, compute_year_stats, moving_average};

fn arb_row() -> impl Strategy<Value = ParsedRow> {
    (
        2000i32..2010,
        prop::sample::select(vec!["AMJ", "MS", "OR", "SMJ"]),
        0u8..=10,
    )
        .prop_map(|(year, journal, woke_score)| ParsedRow {
            year,
            journal: journal.to_string(),
            field: "Management".to_string(),
            woke_score,
            ..Default::default()
        })
}

proptest! {
    /// A window of one leaves the series untouched.
    #[test]
    fn moving_average_window_one_is_identity(values in prop::collection::vec(-100.0f64..100.0, 0..40)) {
        prop_assert_eq!(moving_average(&values, 1), values);
    }

    /// Smoothing keeps length and stays within the series bounds.
    #[test]
    fn moving_average_stays_in_bounds(
        values in prop::collection::vec(0.0f64..10.0, 1..40),
        window in 2usize..9,
    ) {
        let out = moving_average(&values, window);
        prop_assert_eq!(out.len(), values.len());
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for v in out {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }

    /// Z-scored journal series have mean 0 and population stdev 1 (or 0 when flat).
    #[test]
    fn z_scored_series_are_standardized(rows in prop::collection::vec(arb_row(), 1..80)) {
        let trend = compute_journal_trend(&rows, true);
        for series in &trend.series {
            let values: Vec<f64> = series.points.iter().filter_map(|p| p.value).collect();
            if values.is_empty() {
                continue;
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            prop_assert!(mean.abs() < 1e-9, "mean {} for {}", mean, series.group);
            prop_assert!((sd - 1.0).abs() < 1e-9 || sd < 1e-9, "stdev {} for {}", sd, series.group);
        }
    }

    /// Every year statistic lies on the score scale and its CI brackets the mean.
    #[test]
    fn year_stats_are_ordered(rows in prop::collection::vec(arb_row(), 0..80)) {
        for stat in compute_year_stats(&rows) {
            prop_assert!(stat.count > 0);
            prop_assert!(stat.p25 <= stat.median && stat.median <= stat.p75 && stat.p75 <= stat.p90);
            prop_assert!((1.0..=10.0).contains(&stat.mean));
            prop_assert!(stat.ci95_low <= stat.mean + 1e-9 && stat.mean <= stat.ci95_high + 1e-9);
        }
    }
}

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::stats::{mean, population_stdev};
use super::{GroupBy, iter_rows};
use crate::ParsedRow;

/// One year of a group's trend. `value` is `None` when the group has no
/// scored papers that year; charts must not invent a value for the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub value: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub group: String,
    pub points: Vec<TrendPoint>,
}

/// Per-group yearly means aligned on a shared year axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSet {
    pub years: Vec<i32>,
    pub series: Vec<TrendSeries>,
}

impl TrendSet {
    pub fn get(&self, group: &str) -> Option<&TrendSeries> {
        self.series.iter().find(|s| s.group == group)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

impl Bucket {
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Sum/count of scored rows per `(group, year)`.
fn bucket_scores<'a>(
    rows: impl Iterator<Item = &'a ParsedRow>,
    group_by: GroupBy,
) -> HashMap<(&'a str, i32), Bucket> {
    let mut buckets: HashMap<(&str, i32), Bucket> = HashMap::new();
    for row in rows {
        if let Some(score) = row.score() {
            let b = buckets.entry((group_by.key(row), row.year)).or_default();
            b.sum += score;
            b.count += 1;
        }
    }
    buckets
}

/// Z-score a series against its own non-null values (population stdev).
///
/// A flat series divides by 1 so every point becomes 0.
fn z_score(points: Vec<TrendPoint>) -> Vec<TrendPoint> {
    let values: Vec<f64> = points.iter().filter_map(|p| p.value).collect();
    let m = mean(&values).unwrap_or(0.0);
    let sd = population_stdev(&values, m);
    let sd = if sd == 0.0 { 1.0 } else { sd };

    points
        .into_iter()
        .map(|p| TrendPoint {
            value: p.value.map(|v| (v - m) / sd),
            ..p
        })
        .collect()
}

fn compute_group_trend<R: Borrow<ParsedRow>>(
    rows: &[R],
    group_by: GroupBy,
    normalized: bool,
) -> TrendSet {
    let years: Vec<i32> = iter_rows(rows)
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    // Rows without a journal are dropped from journal trends; an empty field is
    // still a group of its own.
    let groups: BTreeSet<&str> = iter_rows(rows)
        .map(|r| group_by.key(r))
        .filter(|g| group_by == GroupBy::Field || !g.is_empty())
        .collect();
    let buckets = bucket_scores(iter_rows(rows), group_by);

    let series = groups
        .into_iter()
        .map(|group| {
            let points: Vec<TrendPoint> = years
                .iter()
                .map(|&year| {
                    let bucket = buckets.get(&(group, year)).copied().unwrap_or_default();
                    TrendPoint {
                        year,
                        value: bucket.mean(),
                        count: bucket.count,
                    }
                })
                .collect();
            TrendSeries {
                group: group.to_string(),
                points: if normalized { z_score(points) } else { points },
            }
        })
        .collect();

    TrendSet { years, series }
}

/// Per-journal yearly mean score, optionally z-scored within each journal.
pub fn compute_journal_trend<R: Borrow<ParsedRow>>(rows: &[R], normalized: bool) -> TrendSet {
    compute_group_trend(rows, GroupBy::Journal, normalized)
}

/// Per-field yearly mean score, optionally z-scored within each field.
pub fn compute_field_trend<R: Borrow<ParsedRow>>(rows: &[R], normalized: bool) -> TrendSet {
    compute_group_trend(rows, GroupBy::Field, normalized)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Column index into `years`.
    pub x: usize,
    /// Row index into `journals`.
    pub y: usize,
    pub journal: String,
    pub year: i32,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub years: Vec<i32>,
    pub journals: Vec<String>,
    pub cells: Vec<HeatmapCell>,
}

/// Journal × year grid of mean scores; empty cells carry 0/0.
pub fn compute_journal_year_heatmap<R: Borrow<ParsedRow>>(rows: &[R], sort_by_mean: bool) -> Heatmap {
    let years: Vec<i32> = iter_rows(rows)
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut journals: Vec<&str> = iter_rows(rows)
        .map(|r| r.journal.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let buckets = bucket_scores(iter_rows(rows), GroupBy::Journal);

    if sort_by_mean {
        let overall: HashMap<&str, f64> = journals
            .iter()
            .map(|&j| {
                let (sum, count) = years
                    .iter()
                    .filter_map(|&y| buckets.get(&(j, y)))
                    .fold((0.0, 0), |(s, c), b| (s + b.sum, c + b.count));
                (j, if count > 0 { sum / count as f64 } else { 0.0 })
            })
            .collect();
        journals.sort_by(|a, b| overall[b].total_cmp(&overall[a]).then_with(|| a.cmp(b)));
    }

    let mut cells = Vec::with_capacity(journals.len() * years.len());
    for (y, journal) in journals.iter().enumerate() {
        for (x, &year) in years.iter().enumerate() {
            let bucket = buckets.get(&(*journal, year)).copied().unwrap_or_default();
            cells.push(HeatmapCell {
                x,
                y,
                journal: journal.to_string(),
                year,
                value: bucket.mean().unwrap_or(0.0),
                count: bucket.count,
            });
        }
    }

    Heatmap {
        years,
        journals: journals.into_iter().map(String::from).collect(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_rows::row;
    use super::*;

    fn values(set: &TrendSet, group: &str) -> Vec<Option<f64>> {
        set.get(group)
            .unwrap()
            .points
            .iter()
            .map(|p| p.value.map(|v| (v * 1e6).round() / 1e6))
            .collect()
    }

    #[test]
    fn journal_trend_raw_and_z_scored() {
        let rows = vec![
            row(2020, "J1", 2),
            row(2021, "J1", 4),
            row(2020, "J2", 6),
            row(2021, "J2", 8),
        ];

        let raw = compute_journal_trend(&rows, false);
        assert_eq!(raw.years, vec![2020, 2021]);
        assert_eq!(values(&raw, "J1"), vec![Some(2.0), Some(4.0)]);
        assert_eq!(values(&raw, "J2"), vec![Some(6.0), Some(8.0)]);

        let norm = compute_journal_trend(&rows, true);
        assert_eq!(values(&norm, "J1"), vec![Some(-1.0), Some(1.0)]);
        assert_eq!(values(&norm, "J2"), vec![Some(-1.0), Some(1.0)]);
    }

    #[test]
    fn gaps_stay_null_and_are_excluded_from_z_scores() {
        let rows = vec![
            row(2019, "J1", 3),
            row(2020, "J2", 5),
            row(2021, "J1", 7),
        ];
        let raw = compute_journal_trend(&rows, false);
        assert_eq!(values(&raw, "J1"), vec![Some(3.0), None, Some(7.0)]);

        let norm = compute_journal_trend(&rows, true);
        assert_eq!(values(&norm, "J1"), vec![Some(-1.0), None, Some(1.0)]);
        // single observation: flat series, stdev treated as 1
        assert_eq!(values(&norm, "J2"), vec![None, Some(0.0), None]);
    }

    #[test]
    fn journal_trend_skips_empty_journal() {
        let rows = vec![row(2020, "", 4), row(2020, "MS", 6)];
        let trend = compute_journal_trend(&rows, false);
        assert_eq!(trend.series.len(), 1);
        assert_eq!(trend.series[0].group, "MS");
    }

    #[test]
    fn field_trend_groups_by_field() {
        let mut rows = vec![row(2020, "MS", 4), row(2020, "MS", 6), row(2020, "OR", 9)];
        rows[2].field = "Operations".into();
        let trend = compute_field_trend(&rows, false);
        assert_eq!(values(&trend, "Accounting"), vec![Some(5.0)]);
        assert_eq!(values(&trend, "Operations"), vec![Some(9.0)]);
        assert_eq!(trend.get("Accounting").unwrap().points[0].count, 2);
    }

    #[test]
    fn heatmap_fills_grid_and_sorts() {
        let rows = vec![row(2020, "AMJ", 2), row(2021, "MS", 9), row(2021, "AMJ", 4)];
        let map = compute_journal_year_heatmap(&rows, false);
        assert_eq!(map.journals, vec!["AMJ", "MS"]);
        assert_eq!(map.cells.len(), 4);
        let empty = map
            .cells
            .iter()
            .find(|c| c.journal == "MS" && c.year == 2020)
            .unwrap();
        assert_eq!((empty.value, empty.count), (0.0, 0));

        let sorted = compute_journal_year_heatmap(&rows, true);
        assert_eq!(sorted.journals, vec!["MS", "AMJ"]);
        assert_eq!(sorted.cells[0].journal, "MS");
        assert_eq!(sorted.cells[0].y, 0);
    }
}

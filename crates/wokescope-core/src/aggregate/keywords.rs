use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{GroupBy, iter_rows};
use crate::ParsedRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCloudItem {
    pub text: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordYearPoint {
    pub year: i32,
    pub count: usize,
    pub total_papers: usize,
    pub per1k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingKeyword {
    pub text: String,
    pub delta_per1k: f64,
    pub early_per1k: f64,
    pub late_per1k: f64,
}

/// Occurrences per row, counting each keyword at most once per row.
fn keyword_frequencies<'a>(rows: impl Iterator<Item = &'a ParsedRow>) -> HashMap<&'a str, usize> {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let unique: HashSet<&str> = row.keywords_list.iter().map(String::as_str).collect();
        for kw in unique {
            *freq.entry(kw).or_insert(0) += 1;
        }
    }
    freq
}

fn ranked(freq: HashMap<&str, usize>, limit: usize) -> Vec<KeywordCount> {
    let mut items: Vec<KeywordCount> = freq
        .into_iter()
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.to_string(),
            count,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    items.truncate(limit);
    items
}

/// Most frequent keywords, ties broken alphabetically.
pub fn top_keywords<R: Borrow<ParsedRow>>(rows: &[R], limit: usize) -> Vec<KeywordCount> {
    ranked(keyword_frequencies(iter_rows(rows)), limit)
}

pub fn keyword_cloud<R: Borrow<ParsedRow>>(rows: &[R], limit: usize) -> Vec<WordCloudItem> {
    top_keywords(rows, limit)
        .into_iter()
        .map(|k| WordCloudItem {
            text: k.keyword,
            value: k.count,
        })
        .collect()
}

/// One word cloud per journal or field, keyed by group name.
pub fn keyword_cloud_by<R: Borrow<ParsedRow>>(
    rows: &[R],
    group_by: GroupBy,
    limit: usize,
) -> BTreeMap<String, Vec<WordCloudItem>> {
    let groups: BTreeSet<&str> = iter_rows(rows).map(|r| group_by.key(r)).collect();
    groups
        .into_iter()
        .map(|group| {
            let freq = keyword_frequencies(iter_rows(rows).filter(|r| group_by.key(r) == group));
            let items = ranked(freq, limit)
                .into_iter()
                .map(|k| WordCloudItem {
                    text: k.keyword,
                    value: k.count,
                })
                .collect();
            (group.to_string(), items)
        })
        .collect()
}

/// Yearly frequency of one keyword, normalized per 1k papers of that year.
pub fn keyword_over_time<R: Borrow<ParsedRow>>(rows: &[R], keyword: &str) -> Vec<KeywordYearPoint> {
    let mut totals: BTreeMap<i32, usize> = BTreeMap::new();
    let mut hits: HashMap<i32, usize> = HashMap::new();

    for row in iter_rows(rows) {
        *totals.entry(row.year).or_insert(0) += 1;
        if row.keywords_list.iter().any(|k| k == keyword) {
            *hits.entry(row.year).or_insert(0) += 1;
        }
    }

    totals
        .into_iter()
        .map(|(year, total_papers)| {
            let count = hits.get(&year).copied().unwrap_or(0);
            KeywordYearPoint {
                year,
                count,
                total_papers,
                per1k: per1k(count, total_papers),
            }
        })
        .collect()
}

fn per1k(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 1000.0
    }
}

/// Keywords whose per-1k rate grew after `split_year`.
///
/// Rows up to and including `split_year` form the early period. Only
/// positive deltas are kept, largest first.
pub fn emerging_keywords<R: Borrow<ParsedRow>>(
    rows: &[R],
    split_year: i32,
    limit: usize,
) -> Vec<EmergingKeyword> {
    let early: Vec<&ParsedRow> = iter_rows(rows).filter(|r| r.year <= split_year).collect();
    let late: Vec<&ParsedRow> = iter_rows(rows).filter(|r| r.year > split_year).collect();

    let rates = |period: &[&ParsedRow]| -> HashMap<String, f64> {
        keyword_frequencies(period.iter().copied())
            .into_iter()
            .map(|(k, v)| (k.to_string(), per1k(v, period.len())))
            .collect()
    };
    let early_rates = rates(&early);
    let late_rates = rates(&late);

    let keys: BTreeSet<&String> = early_rates.keys().chain(late_rates.keys()).collect();
    let mut out: Vec<EmergingKeyword> = keys
        .into_iter()
        .filter_map(|k| {
            let early_per1k = early_rates.get(k).copied().unwrap_or(0.0);
            let late_per1k = late_rates.get(k).copied().unwrap_or(0.0);
            let delta_per1k = late_per1k - early_per1k;
            (delta_per1k > 0.0).then(|| EmergingKeyword {
                text: k.clone(),
                delta_per1k,
                early_per1k,
                late_per1k,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.delta_per1k
            .total_cmp(&a.delta_per1k)
            .then_with(|| a.text.cmp(&b.text))
    });
    out.truncate(limit);
    out
}

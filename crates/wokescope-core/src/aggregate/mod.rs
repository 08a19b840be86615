//! Aggregation engine: pure rollups over a frozen row snapshot.
//!
//! Every function takes the caller's rows by reference and returns plain
//! serializable data. Score statistics skip unscored rows (`woke_score == 0`);
//! keyword rates count every row in their bucket.

use std::borrow::Borrow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Filters, MAX_SCORE, MIN_SCORE, ParsedRow};

mod authors;
mod keywords;
mod stats;
mod trends;

pub use authors::{AuthorDetail, AuthorStat, TimelinePoint, author_detail, compute_author_ranking};
pub use keywords::{
    EmergingKeyword, KeywordCount, KeywordYearPoint, WordCloudItem, emerging_keywords,
    keyword_cloud, keyword_cloud_by, keyword_over_time, top_keywords,
};
pub use stats::{YearStat, compute_year_stats, moving_average, percentile};
pub use trends::{
    Heatmap, HeatmapCell, TrendPoint, TrendSeries, TrendSet, compute_field_trend,
    compute_journal_trend, compute_journal_year_heatmap,
};

/// Row attribute used to bucket trends and word clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Journal,
    Field,
}

impl GroupBy {
    pub(crate) fn key<'a>(&self, row: &'a ParsedRow) -> &'a str {
        match self {
            GroupBy::Journal => &row.journal,
            GroupBy::Field => &row.field,
        }
    }
}

/// Shared global filter pass used by every chart and table.
pub fn filter_rows<'a>(rows: &'a [ParsedRow], filters: &Filters) -> Vec<&'a ParsedRow> {
    let (min_year, max_year) = filters.year_range;
    let (min_score, max_score) = filters.score_range;
    let query = filters.text_query.trim().to_lowercase();

    let journals: HashSet<&str> = filters.journals.iter().map(String::as_str).collect();
    let fields: HashSet<&str> = filters.fields.iter().map(String::as_str).collect();
    let types: HashSet<&str> = filters.types.iter().map(String::as_str).collect();

    rows.iter()
        .filter(|row| row.year >= min_year && row.year <= max_year)
        .filter(|row| row.woke_score >= min_score && row.woke_score <= max_score)
        .filter(|row| journals.is_empty() || journals.contains(row.journal.as_str()))
        .filter(|row| fields.is_empty() || fields.contains(row.field.as_str()))
        .filter(|row| types.is_empty() || types.contains(row.type_main.as_str()))
        .filter(|row| query.is_empty() || row.search_text.contains(&query))
        .collect()
}

/// A single paper as shown in ranking tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPaper {
    pub title: String,
    pub vol: String,
    pub iss: String,
    pub year: i32,
    pub r#abstract: String,
    pub woke_score: u8,
    pub keywords: Vec<String>,
    pub justification: String,
    pub url: String,
    pub journal: String,
    pub field: String,
    pub author: String,
    pub authors_list: Vec<String>,
}

impl From<&ParsedRow> for RankedPaper {
    fn from(row: &ParsedRow) -> Self {
        Self {
            title: row.title.clone(),
            vol: row.vol.clone(),
            iss: row.iss.clone(),
            year: row.year,
            r#abstract: row.r#abstract.clone(),
            woke_score: row.woke_score,
            keywords: row.keywords_list.clone(),
            justification: row.justification.clone(),
            url: row.url.clone(),
            journal: row.journal.clone(),
            field: row.field.clone(),
            author: row.author.clone(),
            authors_list: row.authors_list.clone(),
        }
    }
}

/// Top and bottom papers of one journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRanking {
    pub count: usize,
    pub top: Vec<RankedPaper>,
    pub bottom: Vec<RankedPaper>,
}

/// Rank a journal's scored papers, highest first, keeping `limit` at each end.
pub fn journal_internal_ranking<R: Borrow<ParsedRow>>(
    rows: &[R],
    journal: &str,
    limit: usize,
) -> JournalRanking {
    let subset: Vec<&ParsedRow> = iter_rows(rows).filter(|r| r.journal == journal).collect();

    let mut sorted: Vec<&ParsedRow> = subset.iter().copied().filter(|r| r.is_scored()).collect();
    sorted.sort_by(|a, b| b.woke_score.cmp(&a.woke_score));

    JournalRanking {
        count: subset.len(),
        top: sorted.iter().take(limit).map(|r| RankedPaper::from(*r)).collect(),
        bottom: sorted
            .iter()
            .rev()
            .take(limit)
            .map(|r| RankedPaper::from(*r))
            .collect(),
    }
}

/// Headline numbers for the summary strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub rows: usize,
    pub scored: usize,
    pub mean: f64,
    pub median: f64,
    pub selected_years: String,
    pub selected_journals_count: usize,
    pub selected_fields_count: usize,
}

pub fn data_summary<R: Borrow<ParsedRow>>(rows: &[R], filters: &Filters) -> DataSummary {
    let mut scores: Vec<f64> = iter_rows(rows).filter_map(ParsedRow::score).collect();
    scores.sort_by(f64::total_cmp);

    let mean = stats::mean(&scores).unwrap_or(0.0);
    let median = percentile(&scores, 0.5);

    DataSummary {
        rows: rows.len(),
        scored: scores.len(),
        mean,
        median,
        selected_years: format!("{}-{}", filters.year_range.0, filters.year_range.1),
        selected_journals_count: filters.journals.len(),
        selected_fields_count: filters.fields.len(),
    }
}

pub(crate) fn iter_rows<R: Borrow<ParsedRow>>(rows: &[R]) -> impl Iterator<Item = &ParsedRow> {
    rows.iter().map(<R as Borrow<ParsedRow>>::borrow)
}

/// 95% normal-approximation interval for a mean, clamped to the score range.
pub(crate) fn ci95(mean: f64, stdev: f64, count: usize) -> (f64, f64) {
    if count == 0 {
        return (MIN_SCORE as f64, MIN_SCORE as f64);
    }
    let stderr = stdev / (count as f64).sqrt();
    let low = (mean - 1.96 * stderr).max(MIN_SCORE as f64);
    let high = (mean + 1.96 * stderr).min(MAX_SCORE as f64);
    (low, high)
}

#[cfg(test)]
pub(crate) mod test_rows {
    use crate::ParsedRow;

    pub fn row(year: i32, journal: &str, score: u8) -> ParsedRow {
        ParsedRow {
            year,
            journal: journal.to_string(),
            field: "Accounting".to_string(),
            woke_score: score,
            ..Default::default()
        }
    }
}

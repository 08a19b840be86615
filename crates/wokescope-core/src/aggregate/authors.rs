use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::stats::{mean, sample_stdev};
use super::{RankedPaper, ci95, iter_rows};
use crate::ParsedRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStat {
    pub author: String,
    pub count: usize,
    pub mean: f64,
    pub stdev: f64,
    pub ci95_low: f64,
    pub ci95_high: f64,
}

/// Rank authors by mean score of the papers they appear on.
///
/// Each row contributes once per distinct author. Authors with fewer than
/// `min_count` scored papers are dropped. Ordering: mean desc, count desc,
/// then name.
pub fn compute_author_ranking<R: Borrow<ParsedRow>>(rows: &[R], min_count: usize) -> Vec<AuthorStat> {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in iter_rows(rows) {
        let Some(score) = row.score() else {
            continue;
        };
        let unique: HashSet<&str> = row.authors_list.iter().map(String::as_str).collect();
        for author in unique {
            scores.entry(author).or_default().push(score);
        }
    }

    let mut ranking: Vec<AuthorStat> = scores
        .into_iter()
        .filter(|(_, s)| s.len() >= min_count.max(1))
        .map(|(author, s)| {
            let count = s.len();
            let mean = mean(&s).unwrap_or(0.0);
            let stdev = sample_stdev(&s, mean);
            let (ci95_low, ci95_high) = ci95(mean, stdev, count);
            AuthorStat {
                author: author.to_string(),
                count,
                mean,
                stdev,
                ci95_low,
                ci95_high,
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.mean
            .total_cmp(&a.mean)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.author.cmp(&b.author))
    });
    ranking
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub year: i32,
    pub score: u8,
    pub title: String,
    pub url: String,
}

/// One author's papers, in input order and ranked by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetail {
    pub timeline: Vec<TimelinePoint>,
    pub ranked: Vec<RankedPaper>,
}

pub fn author_detail<R: Borrow<ParsedRow>>(rows: &[R], author: &str) -> AuthorDetail {
    let papers: Vec<&ParsedRow> = iter_rows(rows)
        .filter(|r| r.authors_list.iter().any(|a| a == author))
        .collect();

    let timeline = papers
        .iter()
        .map(|r| TimelinePoint {
            year: r.year,
            score: r.woke_score,
            title: r.title.clone(),
            url: r.url.clone(),
        })
        .collect();

    let mut sorted = papers;
    sorted.sort_by(|a, b| b.woke_score.cmp(&a.woke_score));

    AuthorDetail {
        timeline,
        ranked: sorted.into_iter().map(RankedPaper::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_rows::row;
    use super::*;

    fn authored(year: i32, score: u8, authors: &[&str]) -> ParsedRow {
        ParsedRow {
            authors_list: authors.iter().map(|a| a.to_string()).collect(),
            title: format!("Paper {year}-{score}"),
            ..row(year, "MS", score)
        }
    }

    #[test]
    fn ranking_sorts_and_filters_by_count() {
        let rows = vec![
            authored(2020, 8, &["Ana Li", "Bob Ray"]),
            authored(2021, 6, &["Ana Li"]),
            authored(2021, 9, &["Cara Fox", "Bob Ray"]),
            authored(2022, 7, &["Bob Ray"]),
            authored(2022, 9, &["Cara Fox"]),
        ];

        let ranking = compute_author_ranking(&rows, 2);
        let names: Vec<&str> = ranking.iter().map(|a| a.author.as_str()).collect();
        assert_eq!(names, vec!["Cara Fox", "Bob Ray", "Ana Li"]);

        let bob = &ranking[1];
        assert_eq!(bob.count, 3);
        assert!((bob.mean - 8.0).abs() < 1e-9);
        assert!((bob.stdev - 1.0).abs() < 1e-9);
        assert!(bob.ci95_low < 8.0 && bob.ci95_high > 8.0);

        assert!(compute_author_ranking(&rows, 4).is_empty());
    }

    #[test]
    fn ranking_ties_break_on_count() {
        let rows = vec![
            authored(2020, 5, &["Ana Li"]),
            authored(2020, 5, &["Bob Ray"]),
            authored(2021, 5, &["Bob Ray"]),
        ];
        let ranking = compute_author_ranking(&rows, 1);
        assert_eq!(ranking[0].author, "Bob Ray");
        assert_eq!(ranking[1].author, "Ana Li");
    }

    #[test]
    fn duplicate_author_in_row_counts_once() {
        let rows = vec![authored(2020, 4, &["Ana Li", "Ana Li"])];
        let ranking = compute_author_ranking(&rows, 1);
        assert_eq!(ranking[0].count, 1);
    }

    #[test]
    fn unscored_rows_do_not_contribute() {
        let rows = vec![authored(2020, 0, &["Ana Li"]), authored(2021, 6, &["Ana Li"])];
        let ranking = compute_author_ranking(&rows, 1);
        assert_eq!(ranking[0].count, 1);
        assert_eq!(ranking[0].mean, 6.0);
    }

    #[test]
    fn detail_timeline_and_ranked() {
        let rows = vec![
            authored(2019, 3, &["Ana Li"]),
            authored(2020, 9, &["Bob Ray", "Ana Li"]),
            authored(2021, 5, &["Bob Ray"]),
        ];
        let detail = author_detail(&rows, "Ana Li");
        let years: Vec<i32> = detail.timeline.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2019, 2020]);
        assert_eq!(detail.ranked[0].woke_score, 9);
        assert_eq!(detail.ranked[1].woke_score, 3);
    }
}

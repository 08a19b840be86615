use std::fmt;

use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod config_file;
pub mod journals;

// Re-export for convenience
pub use aggregate::{
    AuthorDetail, AuthorStat, DataSummary, EmergingKeyword, GroupBy, Heatmap, HeatmapCell,
    JournalRanking, KeywordCount, KeywordYearPoint, RankedPaper, TimelinePoint, TrendPoint,
    TrendSeries, TrendSet, WordCloudItem, YearStat,
};
pub use journals::journal_full_name;

/// Lowest valid model score.
pub const MIN_SCORE: u8 = 1;
/// Highest valid model score.
pub const MAX_SCORE: u8 = 10;
/// Sentinel stored when a row's score is missing or malformed.
pub const UNSCORED: u8 = 0;

/// Closed set of article categories produced by the type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeCategory {
    #[serde(rename = "Tutorial")]
    Tutorial,
    #[serde(rename = "Review")]
    Review,
    #[serde(rename = "Commentary/Forum/Debate")]
    Commentary,
    #[serde(rename = "Research Note/Short")]
    ResearchNote,
    #[serde(rename = "Research Article")]
    ResearchArticle,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl TypeCategory {
    /// Every category, in display order.
    pub const ALL: [TypeCategory; 7] = [
        Self::ResearchArticle,
        Self::ResearchNote,
        Self::Review,
        Self::Commentary,
        Self::Tutorial,
        Self::Other,
        Self::Unknown,
    ];

    /// Display label used by filters and exported artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutorial => "Tutorial",
            Self::Review => "Review",
            Self::Commentary => "Commentary/Forum/Debate",
            Self::ResearchNote => "Research Note/Short",
            Self::ResearchArticle => "Research Article",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a display label back into a category.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label.trim())
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One article record after parsing.
///
/// Built once by the row parser and never mutated afterwards; a new dataset
/// replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRow {
    pub year: i32,
    pub vol: String,
    pub iss: String,
    /// Raw scraped author field.
    pub author: String,
    pub title: String,
    pub r#abstract: String,
    pub url: String,
    /// Raw `type` column as scraped.
    pub type_raw: String,
    /// Classified article category.
    pub type_main: TypeCategory,
    pub journal: String,
    pub field: String,
    /// 1..=10, or [`UNSCORED`].
    pub woke_score: u8,
    /// Raw keyword column.
    pub keywords: String,
    pub justification: String,
    /// Lowercased, deduplicated keywords.
    pub keywords_list: Vec<String>,
    /// Cleaned, deduplicated author names.
    pub authors_list: Vec<String>,
    /// `lowercase(title + " " + abstract)`.
    pub search_text: String,
}

impl ParsedRow {
    /// Whether the row carries a usable score.
    pub fn is_scored(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.woke_score)
    }

    /// Score as a float, `None` when unscored.
    pub fn score(&self) -> Option<f64> {
        self.is_scored().then_some(self.woke_score as f64)
    }
}

impl Default for ParsedRow {
    fn default() -> Self {
        Self {
            year: 0,
            vol: String::new(),
            iss: String::new(),
            author: String::new(),
            title: String::new(),
            r#abstract: String::new(),
            url: String::new(),
            type_raw: String::new(),
            type_main: TypeCategory::Unknown,
            journal: String::new(),
            field: String::new(),
            woke_score: UNSCORED,
            keywords: String::new(),
            justification: String::new(),
            keywords_list: Vec::new(),
            authors_list: Vec::new(),
            search_text: String::new(),
        }
    }
}

/// Dashboard filter state applied before every aggregation.
///
/// Empty sets mean "no constraint".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub year_range: (i32, i32),
    pub score_range: (u8, u8),
    pub journals: Vec<String>,
    pub fields: Vec<String>,
    pub types: Vec<String>,
    pub text_query: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            year_range: (i32::MIN, i32::MAX),
            score_range: (UNSCORED, MAX_SCORE),
            journals: Vec::new(),
            fields: Vec::new(),
            types: Vec::new(),
            text_query: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_category_labels_round_trip() {
        for c in TypeCategory::ALL {
            assert_eq!(TypeCategory::from_label(c.as_str()), Some(c));
        }
        assert_eq!(TypeCategory::from_label("Editorial"), None);
    }

    #[test]
    fn type_category_serializes_as_label() {
        let json = serde_json::to_string(&TypeCategory::Commentary).unwrap();
        assert_eq!(json, "\"Commentary/Forum/Debate\"");
    }

    #[test]
    fn unscored_row_has_no_score() {
        let row = ParsedRow::default();
        assert!(!row.is_scored());
        assert_eq!(row.score(), None);

        let row = ParsedRow {
            woke_score: 7,
            ..Default::default()
        };
        assert_eq!(row.score(), Some(7.0));
    }
}

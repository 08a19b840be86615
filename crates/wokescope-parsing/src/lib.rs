use once_cell::sync::Lazy;
use thiserror::Error;

pub mod authors;
pub mod chunks;
pub mod config;
pub mod format;
pub mod keywords;
pub mod noise;
pub mod rows;
pub mod text_processing;
pub mod types;

pub use authors::{AuthorExtraction, AuthorExtractor};
pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use keywords::{canonical_keywords, parse_keywords, parse_keywords_value};
pub use rows::{RUNTIME_SCHEMA, RawRow, RowParser, read_csv_rows, read_json_rows};
pub use types::TypeClassifier;
// Re-export domain types from core (canonical definitions live there)
pub use wokescope_core::{ParsedRow, TypeCategory};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected JSON document: {0}")]
    UnexpectedJson(String),
}

static DEFAULT_EXTRACTOR: Lazy<AuthorExtractor> = Lazy::new(AuthorExtractor::new);
static DEFAULT_CLASSIFIER: Lazy<TypeClassifier> = Lazy::new(TypeClassifier::new);

/// Extract clean, deduplicated author names from a raw byline field.
///
/// Pipeline:
/// 1. Normalize (diacritics, punctuation, contacts, noise phrases, glued text)
/// 2. Split into per-author chunks
/// 3. Pick the most plausible name span in each chunk, dropping chunks with none
/// 4. Format and dedupe case-insensitively
pub fn extract_authors(raw: &str) -> Vec<String> {
    DEFAULT_EXTRACTOR.extract(raw)
}

/// Classify an article type with the default journal allow-list.
pub fn classify_type_main(
    raw_type: &str,
    title: &str,
    abstract_text: &str,
    journal: &str,
) -> TypeCategory {
    DEFAULT_CLASSIFIER.classify(raw_type, title, abstract_text, journal)
}

/// Parse CSV text with the default extraction tables.
pub fn parse_csv_str(text: &str) -> Result<Vec<ParsedRow>, ParsingError> {
    RowParser::new().parse_csv(text)
}

/// Parse a JSON row document with the default extraction tables.
pub fn parse_json_str(text: &str) -> Result<Vec<ParsedRow>, ParsingError> {
    RowParser::new().parse_json(text)
}

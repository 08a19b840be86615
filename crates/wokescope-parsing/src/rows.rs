//! Construction of [`ParsedRow`]s from CSV text or JSON documents.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use wokescope_core::{MAX_SCORE, MIN_SCORE, ParsedRow, UNSCORED};

use crate::authors::{AuthorExtraction, AuthorExtractor};
use crate::config::ParsingConfig;
use crate::keywords::parse_keywords_value;
use crate::types::TypeClassifier;
use crate::ParsingError;

/// Column order of a runtime row chunk.
pub const RUNTIME_SCHEMA: [&str; 13] = [
    "year",
    "vol",
    "iss",
    "author",
    "title",
    "abstract",
    "url",
    "type",
    "journal",
    "field",
    "woke_score",
    "keywords",
    "justification",
];

/// One input record before extraction.
///
/// Scalar columns accept strings, numbers, booleans or null. `keywords`
/// keeps whatever JSON shape it arrived in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub vol: String,
    #[serde(deserialize_with = "lenient_string")]
    pub iss: String,
    #[serde(deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "abstract", deserialize_with = "lenient_string")]
    pub abstract_text: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub type_raw: String,
    #[serde(deserialize_with = "lenient_string")]
    pub journal: String,
    #[serde(deserialize_with = "lenient_string")]
    pub field: String,
    #[serde(deserialize_with = "lenient_string")]
    pub woke_score: String,
    pub keywords: Value,
    #[serde(deserialize_with = "lenient_string")]
    pub justification: String,
}

impl RawRow {
    /// Build a row from values in [`RUNTIME_SCHEMA`] order. Missing trailing
    /// columns are left empty.
    pub fn from_columns(columns: &[Value]) -> Self {
        let text = |i: usize| columns.get(i).map(value_text).unwrap_or_default();
        Self {
            year: text(0),
            vol: text(1),
            iss: text(2),
            author: text(3),
            title: text(4),
            abstract_text: text(5),
            url: text(6),
            type_raw: text(7),
            journal: text(8),
            field: text(9),
            woke_score: text(10),
            keywords: columns.get(11).cloned().unwrap_or(Value::Null),
            justification: text(12),
        }
    }

    fn is_blank(&self) -> bool {
        [
            &self.year,
            &self.author,
            &self.title,
            &self.abstract_text,
            &self.journal,
            &self.woke_score,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number, boolean or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<String, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// Leading integer of a string, like `parseInt`: `"7.0"` → 7, `" 12abc"` → 12.
pub fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Coerce a score column: anything outside 1..=10 becomes [`UNSCORED`].
pub fn coerce_score(text: &str) -> u8 {
    leading_int(text)
        .and_then(|n| u8::try_from(n).ok())
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        .unwrap_or(UNSCORED)
}

/// Turns raw records into [`ParsedRow`]s.
#[derive(Debug, Clone, Default)]
pub struct RowParser {
    authors: AuthorExtractor,
    types: TypeClassifier,
}

impl RowParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ParsingConfig) -> Self {
        Self {
            authors: AuthorExtractor::with_config(config),
            types: TypeClassifier::with_config(config),
        }
    }

    pub fn parse_row(&self, raw: RawRow) -> ParsedRow {
        self.parse_row_detailed(raw).0
    }

    /// [`RowParser::parse_row`] plus the author-extraction diagnostics.
    pub fn parse_row_detailed(&self, raw: RawRow) -> (ParsedRow, AuthorExtraction) {
        let extraction = self.authors.extract_detailed(&raw.author);
        let title = raw.title.trim().to_string();
        let abstract_text = raw.abstract_text.trim().to_string();
        let type_raw = raw.type_raw.trim().to_string();
        let journal = raw.journal.trim().to_string();
        let keywords = match &raw.keywords {
            Value::Array(_) => raw.keywords.to_string(),
            other => value_text(other),
        };

        let row = ParsedRow {
            year: leading_int(&raw.year)
                .and_then(|y| i32::try_from(y).ok())
                .unwrap_or(0),
            vol: raw.vol.trim().to_string(),
            iss: raw.iss.trim().to_string(),
            authors_list: extraction.authors.clone(),
            author: raw.author.trim().to_string(),
            type_main: self.types.classify(&type_raw, &title, &abstract_text, &journal),
            search_text: format!("{title} {abstract_text}").to_lowercase(),
            url: raw.url.trim().to_string(),
            type_raw,
            field: raw.field.trim().to_string(),
            woke_score: coerce_score(&raw.woke_score),
            keywords_list: parse_keywords_value(&raw.keywords),
            keywords,
            justification: raw.justification.trim().to_string(),
            title,
            r#abstract: abstract_text,
            journal,
        };
        (row, extraction)
    }

    /// Parse header-driven CSV text. Malformed records are skipped.
    pub fn parse_csv(&self, text: &str) -> Result<Vec<ParsedRow>, ParsingError> {
        Ok(read_csv_rows(text)?
            .into_iter()
            .map(|raw| self.parse_row(raw))
            .collect())
    }

    /// Parse a JSON array of row objects, or a runtime chunk
    /// `{"year": N, "rows": [[...], ...]}` in [`RUNTIME_SCHEMA`] order.
    pub fn parse_json(&self, text: &str) -> Result<Vec<ParsedRow>, ParsingError> {
        Ok(read_json_rows(text)?
            .into_iter()
            .map(|raw| self.parse_row(raw))
            .collect())
    }
}

/// Read header-driven CSV text into raw records, skipping malformed and
/// blank ones.
pub fn read_csv_rows(text: &str) -> Result<Vec<RawRow>, ParsingError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    let index: Vec<Option<usize>> = RUNTIME_SCHEMA
        .iter()
        .map(|col| headers.iter().position(|h| h == col))
        .collect();
    if index.iter().all(Option::is_none) {
        warn!(?headers, "CSV header has none of the expected columns");
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(record = line + 1, error = %e, "skipping malformed CSV record");
                skipped += 1;
                continue;
            }
        };
        let columns: Vec<Value> = index
            .iter()
            .map(|i| {
                i.and_then(|i| record.get(i))
                    .map(|s| Value::String(s.to_string()))
                    .unwrap_or(Value::Null)
            })
            .collect();
        let raw = RawRow::from_columns(&columns);
        if raw.is_blank() {
            continue;
        }
        rows.push(raw);
    }

    info!(rows = rows.len(), skipped, "read CSV dataset");
    Ok(rows)
}

/// Read a JSON row document into raw records. See [`RowParser::parse_json`]
/// for the accepted shapes.
pub fn read_json_rows(text: &str) -> Result<Vec<RawRow>, ParsingError> {
    let document: Value = serde_json::from_str(text)?;
    let mut skipped = 0usize;

    let raw_rows: Vec<RawRow> = match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::Object(_) => match serde_json::from_value::<RawRow>(item) {
                    Ok(raw) => Some(raw),
                    Err(e) => {
                        warn!(row = i, error = %e, "skipping malformed JSON row");
                        skipped += 1;
                        None
                    }
                },
                Value::Array(columns) => Some(RawRow::from_columns(&columns)),
                _ => {
                    warn!(row = i, "skipping JSON row that is not an object or array");
                    skipped += 1;
                    None
                }
            })
            .collect(),
        Value::Object(mut chunk) => {
            let Some(Value::Array(items)) = chunk.remove("rows") else {
                return Err(ParsingError::UnexpectedJson(
                    "object without a \"rows\" array".to_string(),
                ));
            };
            let chunk_year = chunk.get("year").map(value_text).unwrap_or_default();
            items
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| match item {
                    Value::Array(columns) => {
                        let mut raw = RawRow::from_columns(&columns);
                        if raw.year.trim().is_empty() {
                            raw.year = chunk_year.clone();
                        }
                        Some(raw)
                    }
                    _ => {
                        warn!(row = i, "skipping chunk row that is not an array");
                        skipped += 1;
                        None
                    }
                })
                .collect()
        }
        other => {
            return Err(ParsingError::UnexpectedJson(format!(
                "expected an array or a row chunk, found {}",
                json_kind(&other)
            )));
        }
    };

    let rows: Vec<RawRow> = raw_rows.into_iter().filter(|raw| !raw.is_blank()).collect();
    info!(rows = rows.len(), skipped, "read JSON dataset");
    Ok(rows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

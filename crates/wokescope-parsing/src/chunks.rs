use once_cell::sync::Lazy;
use regex::Regex;

use crate::authors::is_suffix_word;
use crate::config::{DEFAULT_TABLES, ExtractionTables};
use crate::text_processing::{AFFILIATION_BOUNDARY, BOUNDARY};

/// One per-author piece of a normalized field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Begins inside glued institution text, like the `"Ohio State University"`
    /// of `"Ana LiOhio State University"`.
    pub institution_tail: bool,
}

impl Chunk {
    fn new(text: String, institution_tail: bool) -> Self {
        Self {
            text,
            institution_tail,
        }
    }
}

/// Split a normalized author field into per-author chunks.
pub fn split_chunks(text: &str) -> Vec<String> {
    split_chunks_with_tables(text, &DEFAULT_TABLES)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

/// Table-aware version of [`split_chunks`] that keeps the origin of each chunk.
///
/// 1. `;`, `&` and `|` become hard boundaries; split on those, then on
///    affiliation boundaries.
/// 2. A segment holding an affiliation keyword stays whole (its commas belong
///    to addresses).
/// 3. Otherwise split on commas that precede a capitalized, non-suffix word,
///    then on a standalone `and`.
pub(crate) fn split_chunks_with_tables(text: &str, tables: &ExtractionTables) -> Vec<Chunk> {
    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

    let text: String = text
        .chars()
        .map(|c| match c {
            ';' | '&' | '|' => BOUNDARY,
            _ => c,
        })
        .collect();

    let mut chunks = Vec::new();
    for segment in text.split(BOUNDARY) {
        let mut previous: Option<&str> = None;
        for piece in segment.split(AFFILIATION_BOUNDARY) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let institution_tail = previous.is_some_and(|prev| continues_institution(prev, tables));
            previous = Some(piece);

            if tables.has_affiliation(piece) {
                chunks.push(Chunk::new(trim_chunk(piece), institution_tail));
                continue;
            }
            for part in split_on_name_commas(piece) {
                chunks.extend(
                    AND_RE
                        .split(part)
                        .map(|c| Chunk::new(trim_chunk(c), institution_tail)),
                );
            }
        }
    }
    chunks.retain(|c| !c.text.is_empty());
    chunks
}

/// Whether text glued after `previous` is more institution text.
///
/// It is when `previous` ends in an affiliation keyword
/// (`"UniversityBoston College"`) or is a bare name (`"Jane DoeCarnegie
/// Mellon University"`). Text glued to the end of a complete affiliation
/// (`"University of OregonBo Chen"`) starts the next author.
fn continues_institution(previous: &str, tables: &ExtractionTables) -> bool {
    previous
        .split_whitespace()
        .last()
        .is_some_and(|w| tables.is_affiliation_word(w))
        || !tables.has_affiliation(previous)
}

/// Split at commas followed by a capitalized word that is not a suffix, so
/// `"Ana Li, Bob Ray"` splits but `"Lawler, III"` does not.
fn split_on_name_commas(segment: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in segment.match_indices(',') {
        let rest = &segment[idx + 1..];
        let next_word = rest.split_whitespace().next().unwrap_or("");
        let capitalized = next_word.chars().next().is_some_and(char::is_uppercase);
        if capitalized && !is_suffix_word(next_word) {
            pieces.push(&segment[start..idx]);
            start = idx + 1;
        }
    }
    pieces.push(&segment[start..]);
    pieces
}

/// Drop a leading connective and stray punctuation from both ends.
fn trim_chunk(chunk: &str) -> String {
    static LEADING_AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^and(?:\s|$)").unwrap());

    let mut chunk = chunk.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-'));
    while LEADING_AND_RE.is_match(chunk) {
        chunk = chunk[3..].trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':'));
    }
    chunk
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ','))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_and_conjunction() {
        assert_eq!(
            split_chunks("Ana Li and Bob Ray; Cara Fox"),
            vec!["Ana Li", "Bob Ray", "Cara Fox"]
        );
    }

    #[test]
    fn test_comma_before_suffix_is_protected() {
        assert_eq!(
            split_chunks("Edward E. Lawler, III, Ana Li"),
            vec!["Edward E. Lawler, III", "Ana Li"]
        );
    }

    #[test]
    fn test_affiliation_segment_not_split_on_commas() {
        assert_eq!(
            split_chunks("Ana Li, Harvard University, Cambridge, MA"),
            vec!["Ana Li, Harvard University, Cambridge, MA"]
        );
    }

    #[test]
    fn test_markers_split() {
        let text = format!("Jamie J. Ladge {AFFILIATION_BOUNDARY} Boston College {BOUNDARY}");
        assert_eq!(split_chunks(&text), vec!["Jamie J. Ladge", "Boston College"]);
    }

    #[test]
    fn test_chunks_after_glued_names_are_institution_tails() {
        let tables = &*DEFAULT_TABLES;
        let text = format!(
            "Ana Li {a} Ohio State University {b} Bo Chen",
            a = AFFILIATION_BOUNDARY,
            b = BOUNDARY
        );
        let flags: Vec<(String, bool)> = split_chunks_with_tables(&text, tables)
            .into_iter()
            .map(|c| (c.text, c.institution_tail))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("Ana Li".to_string(), false),
                ("Ohio State University".to_string(), true),
                ("Bo Chen".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_name_glued_after_full_affiliation_starts_new_author() {
        let tables = &*DEFAULT_TABLES;
        let text = format!(
            "Ana Li {a} University of Oregon {a} Bo Chen University of Utah",
            a = AFFILIATION_BOUNDARY
        );
        let flags: Vec<bool> = split_chunks_with_tables(&text, tables)
            .iter()
            .map(|c| c.institution_tail)
            .collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_trim_leading_connectives() {
        assert_eq!(split_chunks(", and Ana Li,"), vec!["Ana Li"]);
        assert_eq!(split_chunks("Ana Li & Bob Ray | Cara Fox"), vec!["Ana Li", "Bob Ray", "Cara Fox"]);
        assert_eq!(split_chunks("ANA LI AND BOB RAY"), vec!["ANA LI", "BOB RAY"]);
    }

    #[test]
    fn test_hyphenated_and_prefix_kept() {
        assert_eq!(split_chunks("And-Erson Smith"), vec!["And-Erson Smith"]);
        assert_eq!(split_chunks("Andrea Li"), vec!["Andrea Li"]);
    }

    #[test]
    fn test_lowercase_after_comma_stays() {
        assert_eq!(split_chunks("Ana Li, van Gogh"), vec!["Ana Li, van Gogh"]);
        assert!(split_chunks("").is_empty());
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::{DEFAULT_TABLES, ExtractionTables};
use crate::noise;

/// Hard chunk boundary left where a delimiter or noise phrase was.
pub const BOUNDARY: char = '\u{1e}';
/// Boundary injected between a name and glued affiliation text.
pub const AFFILIATION_BOUNDARY: char = '\u{1f}';

/// How many words past a glue point to look for an affiliation keyword.
const AFFILIATION_LOOKAHEAD: usize = 8;

/// Surname prefixes whose lowercase→uppercase transition is part of the name.
pub(crate) static NAME_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mc", "mac", "fitz", "de", "di", "da", "du", "la", "le", "van", "von", "st", "o'",
    ]
    .into_iter()
    .collect()
});

/// An author field after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedField {
    /// Cleaned text, possibly containing [`BOUNDARY`] and
    /// [`AFFILIATION_BOUNDARY`] markers.
    pub text: String,
    /// Whether any affiliation text was seen.
    pub had_affiliation: bool,
}

/// Decompose and drop combining marks: `"Müller"` → `"Muller"`.
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Map dash and apostrophe variants to ASCII `-` and `'`.
pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{02BC}' | '\u{2032}' | '`' => '\'',
            _ => c,
        })
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"Carl.P"` → `"Carl P"`, `"J.Smith"` → `"J. Smith"`.
///
/// Dot-joined capitals (`"J.R."`) are left alone.
pub fn split_glued_initials(text: &str) -> String {
    static WORD_DOT_CAP_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\p{L}{2,})\.(\p{Lu})").unwrap());
    static INITIAL_DOT_WORD_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b(\p{Lu})\.(\p{Lu}\p{Ll})").unwrap());

    let text = WORD_DOT_CAP_RE.replace_all(text, "$1 $2");
    INITIAL_DOT_WORD_RE.replace_all(&text, "$1. $2").into_owned()
}

/// `"Jr.University"` → `"Jr. University"`, `"IIIUniversity"` → `"III University"`.
pub fn split_glued_suffix(text: &str) -> String {
    static SUFFIX_GLUE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b(Jr\.?|Sr\.?|III|II|IV|VI|V)(\p{Lu}\p{Ll})").unwrap());
    SUFFIX_GLUE_RE.replace_all(text, "$1 $2").into_owned()
}

/// Split a token at lowercase→uppercase transitions.
///
/// A split needs at least `min_lower` lowercase letters right before the
/// capital, and never happens after a surname prefix (`McDonald`).
pub(crate) fn camel_pieces(token: &str, min_lower: usize) -> Vec<&str> {
    let chars: Vec<(usize, char)> = token.char_indices().collect();
    let mut pieces = Vec::new();
    let (mut start_byte, mut start_idx) = (0usize, 0usize);

    for k in 1..chars.len() {
        let (byte, c) = chars[k];
        if !c.is_uppercase() || k - start_idx < min_lower.max(1) {
            continue;
        }
        if !chars[k - min_lower.max(1)..k].iter().all(|(_, p)| p.is_lowercase()) {
            continue;
        }
        let piece = &token[start_byte..byte];
        if NAME_PREFIXES.contains(piece.to_lowercase().as_str()) {
            continue;
        }
        pieces.push(piece);
        start_byte = byte;
        start_idx = k;
    }
    pieces.push(&token[start_byte..]);
    pieces
}

fn is_marker(word: &str) -> bool {
    word.chars().all(|c| c == BOUNDARY || c == AFFILIATION_BOUNDARY)
}

struct Word<'a> {
    text: &'a str,
    /// No whitespace between this word and the previous one.
    glued: bool,
}

/// Whether an affiliation keyword appears within the next few words.
///
/// Stops at markers and at words ending a comma- or semicolon-delimited run.
fn affiliation_ahead(words: &[Word<'_>], tables: &ExtractionTables) -> bool {
    for word in words.iter().take(AFFILIATION_LOOKAHEAD) {
        if is_marker(word.text) {
            return false;
        }
        if tables.is_affiliation_word(word.text) {
            return true;
        }
        if word.text.ends_with([',', ';']) {
            return false;
        }
    }
    false
}

/// Inject [`AFFILIATION_BOUNDARY`] where affiliation text is glued to a name
/// (`"LadgeNortheastern University"`) or where a keyword is glued to the next
/// institution (`"UniversityBoston College"`).
///
/// Returns the rewritten text and whether any boundary was injected. Glue
/// points with no affiliation nearby are left as they are.
pub(crate) fn split_affiliation_glue(text: &str, tables: &ExtractionTables) -> (String, bool) {
    let words: Vec<Word<'_>> = text
        .split_whitespace()
        .flat_map(|token| {
            camel_pieces(token, 1)
                .into_iter()
                .enumerate()
                .map(|(j, piece)| Word {
                    text: piece,
                    glued: j > 0,
                })
        })
        .collect();

    let mut out = String::with_capacity(text.len() + 8);
    let mut injected = false;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            if !word.glued {
                out.push(' ');
            } else if tables.is_affiliation_word(words[i - 1].text)
                || affiliation_ahead(&words[i..], tables)
            {
                out.push(' ');
                out.push(AFFILIATION_BOUNDARY);
                out.push(' ');
                injected = true;
            }
        }
        out.push_str(word.text);
    }
    (out, injected)
}

/// Normalize a raw scraped author field with the default tables.
pub fn normalize_author_field(raw: &str) -> NormalizedField {
    normalize_author_field_with_tables(raw, &DEFAULT_TABLES)
}

/// Table-aware version of [`normalize_author_field`].
pub(crate) fn normalize_author_field_with_tables(
    raw: &str,
    tables: &ExtractionTables,
) -> NormalizedField {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return NormalizedField::default();
    }

    let text = strip_diacritics(raw);
    let text = normalize_punctuation(&text);
    let text = collapse_whitespace(&text);
    let text = noise::strip_editorial_note(&text, &tables.editorial_note_re);
    let text = noise::strip_contacts(&text);
    let text = noise::mark_noise_phrases(&text, &tables.noise_phrases);
    let text = noise::strip_superscripts(&text);
    let text = split_glued_initials(&text);
    let text = split_glued_suffix(&text);
    let (text, injected) = split_affiliation_glue(&text, tables);
    let text = collapse_whitespace(&text);

    NormalizedField {
        had_affiliation: injected || tables.has_affiliation(&text),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Müller Ñúñez Łukasz"), "Muller Nunez Łukasz");
        assert_eq!(strip_diacritics("José"), "Jose");
    }

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(normalize_punctuation("Smith\u{2013}Jones O\u{2019}Brien"), "Smith-Jones O'Brien");
    }

    #[test]
    fn test_glued_initials_and_suffix() {
        assert_eq!(split_glued_initials("Carl.P Smith"), "Carl P Smith");
        assert_eq!(split_glued_initials("J.Smith"), "J. Smith");
        assert_eq!(split_glued_initials("J.R. Smith"), "J.R. Smith");
        assert_eq!(split_glued_suffix("Lawler, IIIUniversity"), "Lawler, III University");
        assert_eq!(split_glued_suffix("Doe Jr.Harvard"), "Doe Jr. Harvard");
        assert_eq!(split_glued_suffix("Victor Vance"), "Victor Vance");
    }

    #[test]
    fn test_camel_pieces() {
        assert_eq!(camel_pieces("LadgeNortheastern", 1), vec!["Ladge", "Northeastern"]);
        assert_eq!(camel_pieces("McDonald", 1), vec!["McDonald"]);
        assert_eq!(camel_pieces("FitzGerald", 3), vec!["FitzGerald"]);
        assert_eq!(camel_pieces("JaneDoe", 3), vec!["Jane", "Doe"]);
        assert_eq!(camel_pieces("LiWang", 3), vec!["LiWang"]);
        assert_eq!(camel_pieces("", 1), vec![""]);
    }

    #[test]
    fn test_affiliation_glue() {
        let tables = &*DEFAULT_TABLES;
        let (out, injected) =
            split_affiliation_glue("Jamie J. LadgeNortheastern UniversityBoston College", tables);
        assert!(injected);
        assert_eq!(
            out,
            format!(
                "Jamie J. Ladge {a} Northeastern University {a} Boston College",
                a = AFFILIATION_BOUNDARY
            )
        );

        // No affiliation nearby: glue is kept for the extractor to handle.
        let (out, injected) = split_affiliation_glue("JaneDoe, Harvard University", tables);
        assert!(!injected);
        assert_eq!(out, "JaneDoe, Harvard University");
    }

    #[test]
    fn test_normalize_field() {
        let field = normalize_author_field(
            "Edward E. Lawler, IIIUniversity of Southern CaliforniaSearch for more papers by this author",
        );
        assert_eq!(
            field.text,
            format!("Edward E. Lawler, III University of Southern California {BOUNDARY}")
        );
        assert!(field.had_affiliation);

        assert_eq!(normalize_author_field("  nan "), NormalizedField::default());
        assert_eq!(normalize_author_field("Ana  Li").text, "Ana Li");
        assert!(!normalize_author_field("Ana Li").had_affiliation);
    }
}

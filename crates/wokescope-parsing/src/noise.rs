//! Removal of publisher boilerplate, contact details and editorial notes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text_processing::BOUNDARY;

/// Strip URLs, ORCID identifiers (linked or bare) and email addresses.
pub fn strip_contacts(text: &str) -> String {
    static URL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.|orcid\.org/)\S*").unwrap());
    static ORCID_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b\d{4}-\d{4}-\d{4}-\d{3}[\dX]\b").unwrap());
    static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").unwrap());

    let text = URL_RE.replace_all(text, " ");
    let text = ORCID_RE.replace_all(&text, " ");
    EMAIL_RE.replace_all(&text, " ").into_owned()
}

/// Cut a trailing editorial-note sentence.
pub fn strip_editorial_note(text: &str, note_re: &Regex) -> String {
    note_re.replace(text, " ").into_owned()
}

/// Replace every noise phrase with a hard chunk boundary.
///
/// The boundary keeps two names on either side of a removed phrase from
/// being merged into one chunk.
pub fn mark_noise_phrases<S: AsRef<str>>(text: &str, phrases: &[S]) -> String {
    let marker = format!(" {BOUNDARY} ");
    let mut out = text.to_string();
    for phrase in phrases {
        let phrase = phrase.as_ref();
        if !phrase.is_empty() && out.contains(phrase) {
            out = out.replace(phrase, &marker);
        }
    }
    out
}

/// Delete noise phrases outright (chunk-level cleanup).
pub fn remove_noise_phrases<S: AsRef<str>>(text: &str, phrases: &[S]) -> String {
    let mut out = text.to_string();
    for phrase in phrases {
        let phrase = phrase.as_ref();
        if !phrase.is_empty() {
            out = out.replace(phrase, " ");
        }
    }
    out
}

/// Drop affiliation footnote markers: digits glued to or standing apart
/// from names, and the usual footnote symbols.
pub fn strip_superscripts(text: &str) -> String {
    static GLUED_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L})\d+").unwrap());
    static LONE_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());
    static SYMBOLS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*†‡§¶#]+").unwrap());

    let text = GLUED_DIGITS_RE.replace_all(text, "$1 ");
    let text = LONE_DIGITS_RE.replace_all(&text, " ");
    SYMBOLS_RE.replace_all(&text, " ").into_owned()
}

/// Remove `( ... )` and `[ ... ]` asides.
pub fn strip_parentheticals(text: &str) -> String {
    static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap());
    PAREN_RE.replace_all(text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NOISE_PHRASES;

    #[test]
    fn test_strip_contacts() {
        let out = strip_contacts("Ana Li https://orcid.org/0000-0002-1825-0097 ana@uni.edu");
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), vec!["Ana", "Li"]);

        let out = strip_contacts("Bob Ray 0000-0002-1825-009X");
        assert_eq!(out.trim(), "Bob Ray");

        let out = strip_contacts("Cara Fox orcid.org/0000-0001-2345-6789");
        assert_eq!(out.trim(), "Cara Fox");
    }

    #[test]
    fn test_noise_becomes_boundary() {
        let out = mark_noise_phrases(
            "Jane DoeSearch for more papers by this authorJohn Roe",
            DEFAULT_NOISE_PHRASES,
        );
        assert_eq!(out, format!("Jane Doe {BOUNDARY} John Roe"));
    }

    #[test]
    fn test_noise_is_case_sensitive() {
        let out = mark_noise_phrases("Jane Doe google scholar", DEFAULT_NOISE_PHRASES);
        assert!(!out.contains(BOUNDARY));
    }

    #[test]
    fn test_superscripts() {
        let out = strip_superscripts("Ana Li1,2* and Bob Ray3†");
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>(),
            vec!["Ana", "Li", ",", "and", "Bob", "Ray"]
        );
    }

    #[test]
    fn test_editorial_note() {
        let re = Regex::new(r"(?i)\bserved\s+as\s+.*?\beditor\b.*$").unwrap();
        let out = strip_editorial_note(
            "Ana Li; Bob Ray. Cara Fox served as associate editor for this article.",
            &re,
        );
        assert_eq!(out.trim(), "Ana Li; Bob Ray. Cara Fox");
    }

    #[test]
    fn test_parentheticals() {
        assert_eq!(strip_parentheticals("Ana Li (corresponding)").trim(), "Ana Li");
        assert_eq!(strip_parentheticals("Bob Ray [1]").trim(), "Bob Ray");
    }
}

//! Author-name extraction from scraped byline strings.
//!
//! Pipeline per field: normalize → split into chunks → pull one candidate
//! name out of each chunk → format → dedupe (case-insensitive). A chunk that
//! yields no valid candidate is dropped; extraction never fails.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chunks::split_chunks_with_tables;
use crate::config::{ExtractionTables, ParsingConfig};
use crate::format::{NameToken, TokenKind, format_initial, format_name, format_word};
use crate::noise::{remove_noise_phrases, strip_parentheticals};
use crate::text_processing::{
    AFFILIATION_BOUNDARY, BOUNDARY, camel_pieces, collapse_whitespace,
    normalize_author_field_with_tables,
};

static INITIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}\.?(?:-?\p{Lu}\.)*$").unwrap());
static CORE_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}[\p{L}'-]*$").unwrap());
static ET_AL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s+et\.?\s*al\.?$").unwrap());
static FIELD_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[;,&|]|\sand\s").unwrap());

static PARTICLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "de", "da", "del", "della", "der", "den", "di", "du", "van", "von", "bin", "binti", "ibn",
        "ben", "al", "el", "la", "le", "ter", "ten", "dos", "das", "do", "y",
    ]
    .into_iter()
    .collect()
});

/// Place names that are also capitalized words; a candidate made only of
/// these is an address, not a person.
static GEOGRAPHIC: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "new", "york", "los", "angeles", "san", "francisco", "diego", "hong", "kong", "singapore",
        "boston", "chicago", "california", "texas", "london", "paris", "berlin", "tokyo",
        "beijing", "shanghai", "toronto", "sydney", "melbourne", "southern", "northern",
        "eastern", "western", "north", "south", "east", "west", "carolina", "jersey", "hampshire",
        "washington", "cambridge", "massachusetts", "pennsylvania", "philadelphia", "atlanta",
        "seattle", "austin", "houston", "dallas", "miami", "florida", "georgia", "virginia",
        "michigan", "ohio", "illinois", "indiana", "wisconsin", "minnesota", "colorado",
        "arizona", "oregon", "utah", "canada", "china", "korea", "japan", "india", "germany",
        "france", "italy", "spain", "netherlands", "switzerland", "sweden", "denmark", "norway",
        "finland", "israel", "australia", "zealand", "kingdom", "united", "states", "city",
    ]
    .into_iter()
    .collect()
});

/// `Jr`, `Sr.`, `II`, `III`, `IV`, `VI` (case-insensitive, surrounding
/// punctuation ignored). A bare `V` is positional and handled separately.
pub(crate) fn is_suffix_word(word: &str) -> bool {
    let bare = word.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
    matches!(
        bare.to_lowercase().as_str(),
        "jr" | "sr" | "ii" | "iii" | "iv" | "vi"
    )
}

/// Per-field extraction outcome with diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorExtraction {
    pub authors: Vec<String>,
    pub had_affiliation: bool,
    pub chunks_total: usize,
    pub chunks_rejected: usize,
}

/// Why token collection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Comma,
    Suffix,
    /// Ran into a stoplisted or affiliation word.
    Stopword,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    Strict,
    /// Also accepts a single core word next to an initial (`J. Smith`).
    Relaxed,
}

struct RawToken<'a> {
    text: &'a str,
    comma_after: bool,
}

enum Class {
    Token(TokenKind),
    Stopword,
    Reject,
}

/// A configurable author extractor.
///
/// The default constructor uses the built-in English tables; use
/// [`AuthorExtractor::with_config`] to swap noise phrases, affiliation
/// keywords or stopwords.
#[derive(Debug, Clone)]
pub struct AuthorExtractor {
    tables: ExtractionTables,
}

impl Default for AuthorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorExtractor {
    pub fn new() -> Self {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> Self {
        Self {
            tables: config.tables(),
        }
    }

    /// Cleaned, deduplicated author names of one raw field.
    pub fn extract(&self, raw: &str) -> Vec<String> {
        self.extract_detailed(raw).authors
    }

    pub fn extract_detailed(&self, raw: &str) -> AuthorExtraction {
        let normalized = normalize_author_field_with_tables(raw, &self.tables);
        let mut result = AuthorExtraction {
            had_affiliation: normalized.had_affiliation,
            ..Default::default()
        };
        if normalized.text.is_empty() {
            return result;
        }

        // A lone "X et al." field is taken as-is without chunking.
        let whole = normalized.text.trim();
        if !whole.contains([BOUNDARY, AFFILIATION_BOUNDARY]) && !FIELD_SEPARATOR_RE.is_match(whole) {
            if let Some(name) = self.et_al(whole) {
                tracing::debug!(raw, name = %name, "whole-field et al.");
                result.chunks_total = 1;
                result.authors.push(name);
                return result;
            }
        }

        let chunks = split_chunks_with_tables(&normalized.text, &self.tables);
        result.chunks_total = chunks.len();

        let mut seen: HashSet<String> = HashSet::new();
        for chunk in &chunks {
            match self.extract_candidate(&chunk.text, chunk.institution_tail) {
                Some(name) => {
                    if seen.insert(name.to_lowercase()) {
                        result.authors.push(name);
                    }
                }
                None => {
                    tracing::debug!(
                        chunk = %chunk.text,
                        institution_tail = chunk.institution_tail,
                        "rejected author chunk"
                    );
                    result.chunks_rejected += 1;
                }
            }
        }
        result
    }

    /// Extract one display name from a single chunk, or `None`.
    pub fn extract_chunk(&self, chunk: &str) -> Option<String> {
        self.extract_candidate(chunk, false)
    }

    fn extract_candidate(&self, chunk: &str, institution_tail: bool) -> Option<String> {
        let chunk = collapse_whitespace(chunk);
        if let Some(caps) = ET_AL_RE.captures(&chunk) {
            tracing::debug!(chunk = %chunk, "et al. chunk");
            return self.format_et_al_lead(&caps[1]);
        }

        let cleaned = remove_noise_phrases(&strip_parentheticals(&chunk), &self.tables.noise_phrases);
        let split: Vec<&str> = cleaned
            .split_whitespace()
            .flat_map(|token| camel_pieces(token, 3))
            .collect();
        let had_affiliation = split.iter().any(|w| self.tables.is_affiliation_word(w));

        let tokens: Vec<RawToken<'_>> = split
            .iter()
            .map(|t| RawToken {
                text: t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '"' | '(' | ')')),
                comma_after: t.ends_with(','),
            })
            .filter(|t| !t.text.is_empty())
            .collect();

        let (mut collected, stop) = self.collect(&tokens);
        while collected.last().is_some_and(|t| t.kind == TokenKind::Particle) {
            collected.pop();
        }
        collapse_repeated_half(&mut collected);

        let accepted = self.select(&collected, stop, had_affiliation, institution_tail)?;
        Some(format_name(&accepted))
    }

    /// `"<lead> et al."` if the text is an et-al. form with a name-like lead.
    fn et_al(&self, text: &str) -> Option<String> {
        let caps = ET_AL_RE.captures(text)?;
        self.format_et_al_lead(&caps[1])
    }

    fn format_et_al_lead(&self, lead: &str) -> Option<String> {
        let words: Vec<&str> = lead
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| matches!(c, ',' | ';' | ':')))
            .filter(|w| !w.is_empty())
            .collect();
        let first = words.first()?;
        if !first.starts_with(char::is_uppercase)
            || words.len() > self.tables.max_name_tokens
            || words.iter().any(|w| w.chars().any(|c| c.is_ascii_digit()))
            || words.iter().any(|w| self.tables.is_stopword(w))
        {
            return None;
        }

        let formatted: Vec<String> = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if INITIAL_RE.is_match(w) {
                    format_initial(w)
                } else if i > 0 && PARTICLES.contains(*w) {
                    w.to_string()
                } else {
                    format_word(w)
                }
            })
            .collect();
        Some(format!("{} et al.", formatted.join(" ")))
    }

    fn classify(&self, text: &str, first: bool, next: Option<&str>, last: bool) -> Class {
        if text.chars().any(|c| c.is_ascii_digit()) {
            return Class::Reject;
        }
        if !first && (is_suffix_word(text) || (last && text == "V")) {
            return Class::Token(TokenKind::Suffix);
        }
        if INITIAL_RE.is_match(text) {
            return Class::Token(TokenKind::Initial);
        }
        let next_capitalized = next.is_some_and(|n| n.starts_with(char::is_uppercase));
        if PARTICLES.contains(text) && (!first || next_capitalized) {
            return Class::Token(TokenKind::Particle);
        }
        let word = text.trim_end_matches('.');
        if self.tables.is_stopword(word) {
            return Class::Stopword;
        }
        if CORE_WORD_RE.is_match(word) {
            return Class::Token(TokenKind::Core);
        }
        Class::Reject
    }

    /// Collect name tokens left to right until the first disqualifying one.
    fn collect(&self, tokens: &[RawToken<'_>]) -> (Vec<NameToken>, Stop) {
        let mut out: Vec<NameToken> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let next = tokens.get(i + 1).map(|t| t.text);
            let last = i + 1 == tokens.len();
            let class = self.classify(token.text, out.is_empty(), next, last);
            tracing::trace!(token = token.text, kind = class_label(&class), "classified token");

            match class {
                Class::Token(TokenKind::Suffix) => {
                    out.push(NameToken::new(token.text, TokenKind::Suffix));
                    return (out, Stop::Suffix);
                }
                Class::Token(kind) => out.push(NameToken::new(token.text, kind)),
                Class::Stopword => return (out, Stop::Stopword),
                Class::Reject => {
                    // "Ming zhu Wang": a lowercase word between two names is kept.
                    let sandwiched = !out.is_empty()
                        && token.text.chars().all(char::is_lowercase)
                        && next.is_some_and(|n| n.starts_with(char::is_uppercase));
                    if !sandwiched {
                        return (out, Stop::Other);
                    }
                    out.push(NameToken::new(token.text, TokenKind::Core));
                }
            }

            if token.comma_after && !next.is_some_and(is_suffix_word) {
                return (out, Stop::Comma);
            }
        }
        (out, Stop::End)
    }

    /// Choose the accepted name from the collected tokens.
    ///
    /// When collection ran into affiliation text the shortest valid prefix
    /// wins, so institution words that look like names are not kept.
    /// Otherwise the whole sequence is taken if valid, then the shortest
    /// valid prefix, then the shortest prefix passing relaxed validation.
    ///
    /// In an institution tail the words before the keyword belong to the
    /// institution (`"Carnegie Mellon"`), so a name must be a strict prefix
    /// of them.
    fn select(
        &self,
        collected: &[NameToken],
        stop: Stop,
        had_affiliation: bool,
        institution_tail: bool,
    ) -> Option<Vec<NameToken>> {
        let at_keyword = had_affiliation && stop == Stop::Stopword;
        let whole_run_is_institution = institution_tail && at_keyword;
        let affiliation_cut = at_keyword && collected.len() > 2;
        if !affiliation_cut
            && !whole_run_is_institution
            && self.is_valid(collected, Validation::Strict)
        {
            return Some(collected.to_vec());
        }

        for mode in [Validation::Strict, Validation::Relaxed] {
            for n in 1..collected.len() {
                let prefix = &collected[..n];
                if !self.is_valid(prefix, mode) {
                    continue;
                }
                let mut accepted = prefix.to_vec();
                if collected[n].kind == TokenKind::Suffix {
                    accepted.push(collected[n].clone());
                }
                return Some(accepted);
            }
            if !whole_run_is_institution
                && (affiliation_cut || mode == Validation::Relaxed)
                && self.is_valid(collected, mode)
            {
                return Some(collected.to_vec());
            }
        }
        None
    }

    fn is_valid(&self, tokens: &[NameToken], mode: Validation) -> bool {
        if tokens.is_empty() || tokens.len() > self.tables.max_name_tokens {
            return false;
        }
        if tokens[..tokens.len() - 1]
            .iter()
            .any(|t| t.kind == TokenKind::Suffix)
        {
            return false;
        }
        if tokens.iter().any(|t| t.text.chars().any(|c| c.is_ascii_digit())) {
            return false;
        }

        let core: Vec<&NameToken> = tokens.iter().filter(|t| t.kind == TokenKind::Core).collect();
        let has_initial = tokens.iter().any(|t| t.kind == TokenKind::Initial);
        let count_ok = (2..=5).contains(&core.len())
            || (mode == Validation::Relaxed && core.len() == 1 && has_initial);
        if !count_ok {
            return false;
        }
        if core.iter().any(|t| self.tables.is_stopword(&t.text)) {
            return false;
        }
        !core
            .iter()
            .all(|t| GEOGRAPHIC.contains(t.text.to_lowercase().as_str()))
    }
}

fn class_label(class: &Class) -> &'static str {
    match class {
        Class::Token(TokenKind::Initial) => "initial",
        Class::Token(TokenKind::Core) => "core",
        Class::Token(TokenKind::Particle) => "particle",
        Class::Token(TokenKind::Suffix) => "suffix",
        Class::Stopword => "stopword",
        Class::Reject => "reject",
    }
}

/// `"Sumita Raghuram Sumita Raghuram"` → `"Sumita Raghuram"`.
fn collapse_repeated_half(tokens: &mut Vec<NameToken>) {
    let n = tokens.len();
    if n < 2 || n % 2 != 0 {
        return;
    }
    let (a, b) = tokens.split_at(n / 2);
    if a.iter().zip(b).all(|(x, y)| x.text.to_lowercase() == y.text.to_lowercase()) {
        tokens.truncate(n / 2);
    }
}

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use wokescope_core::config_file::ExtractionConfig;

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Publisher boilerplate that scrapers leave inside author bylines.
/// Matched verbatim (case-sensitive).
pub const DEFAULT_NOISE_PHRASES: &[&str] = &[
    "Search for more papers by this author",
    "Author links open overlay panel",
    "Oxford Academic",
    "PubMed",
    "Google Scholar",
    "View ORCID Profile",
    "Find articles by",
    "Corresponding author",
];

/// Words that mark the start of institutional text. Case as authored; the
/// glue detector relies on the leading capital.
pub const DEFAULT_AFFILIATION_KEYWORDS: &[&str] = &[
    "University",
    "Universidad",
    "Universite",
    "Universitat",
    "College",
    "School",
    "Department",
    "Institute",
    "Center",
    "Centre",
    "Faculty",
    "Hospital",
    "Campus",
    "Program",
    "Programme",
    "Academy",
    "Laboratory",
    "Lab",
    "Office",
];

/// Words that can never be part of a person's name (compared lowercase).
/// Affiliation keywords are always included on top of these.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "univ", "dept", "division", "unit", "graduate", "business", "management", "economics",
    "finance", "financial", "accounting", "marketing", "studies", "study", "organization",
    "organisation", "organizational", "research", "science", "sciences", "journal", "review",
    "editorial", "editor", "editors", "associate", "board", "society", "association",
    "foundation", "group", "sustainability", "strategy", "strategic",
    "policy", "technology", "engineering", "statistics", "operations", "information", "systems",
    "corresponding", "author", "authors", "professor", "abstract", "chair", "inc", "ltd", "llc",
    "corp", "company", "federal", "reserve", "national", "international", "global",
    "american", "european", "the", "and", "of", "for", "in", "at", "on", "with", "mit", "usa",
    "uk", "nber", "cepr", "ssrn", "ceo", "phd", "mba", "email", "orcid", "scholar", "pubmed",
    "academic", "oxford", "links", "overlay", "panel", "search", "papers", "more", "this",
];

/// Journals whose scraped records routinely omit the article type; only
/// these may have their type inferred from title and abstract.
pub const DEFAULT_INFER_TYPE_JOURNALS: &[&str] = &["MS", "MKS", "ISR", "OR", "MSOM", "JOC", "OS"];

/// Longest accepted name, in tokens.
pub const DEFAULT_MAX_NAME_TOKENS: usize = 6;

static DEFAULT_EDITORIAL_NOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bserved\s+as\s+.*?\beditor\b.*$|\bauthor\s+notes\b.*$").unwrap()
});

/// Configuration for the author and type extraction tables.
///
/// List fields are [`ListOverride`]s over the built-in English tables.
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    pub(crate) noise_phrases: ListOverride<String>,
    pub(crate) affiliation_keywords: ListOverride<String>,
    pub(crate) stopwords: ListOverride<String>,
    pub(crate) infer_type_journals: ListOverride<String>,
    /// Trailing editorial-note sentence; `None` means the built-in pattern.
    pub(crate) editorial_note_re: Option<Regex>,
    pub(crate) max_name_tokens: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            noise_phrases: ListOverride::Default,
            affiliation_keywords: ListOverride::Default,
            stopwords: ListOverride::Default,
            infer_type_journals: ListOverride::Default,
            editorial_note_re: None,
            max_name_tokens: DEFAULT_MAX_NAME_TOKENS,
        }
    }
}

impl ParsingConfig {
    pub fn max_name_tokens(&self) -> usize {
        self.max_name_tokens
    }

    /// Resolve every override into lookup tables.
    pub(crate) fn tables(&self) -> ExtractionTables {
        let resolve = |list: &ListOverride<String>, defaults: &[&str]| -> Vec<String> {
            let defaults: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
            list.resolve(&defaults)
        };

        let mut noise_phrases = resolve(&self.noise_phrases, DEFAULT_NOISE_PHRASES);
        // Longer phrases first so a phrase containing another is removed whole.
        noise_phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));
        noise_phrases.retain(|p| !p.trim().is_empty());

        let affiliation_keywords: HashSet<String> =
            resolve(&self.affiliation_keywords, DEFAULT_AFFILIATION_KEYWORDS)
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect();

        let mut stopwords: HashSet<String> = resolve(&self.stopwords, DEFAULT_STOPWORDS)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        stopwords.extend(affiliation_keywords.iter().cloned());

        let infer_type_journals = resolve(&self.infer_type_journals, DEFAULT_INFER_TYPE_JOURNALS)
            .into_iter()
            .map(|j| j.trim().to_uppercase())
            .collect();

        ExtractionTables {
            noise_phrases,
            affiliation_keywords,
            stopwords,
            infer_type_journals,
            editorial_note_re: self
                .editorial_note_re
                .clone()
                .unwrap_or_else(|| DEFAULT_EDITORIAL_NOTE_RE.clone()),
            max_name_tokens: self.max_name_tokens.max(1),
        }
    }
}

/// Resolved, lookup-ready form of a [`ParsingConfig`].
#[derive(Debug, Clone)]
pub(crate) struct ExtractionTables {
    pub noise_phrases: Vec<String>,
    /// Lowercase.
    pub affiliation_keywords: HashSet<String>,
    /// Lowercase; a superset of the affiliation keywords.
    pub stopwords: HashSet<String>,
    /// Uppercase journal codes.
    pub infer_type_journals: HashSet<String>,
    pub editorial_note_re: Regex,
    pub max_name_tokens: usize,
}

impl ExtractionTables {
    /// Whether `word`, ignoring surrounding punctuation, is an affiliation keyword.
    pub fn is_affiliation_word(&self, word: &str) -> bool {
        let core = word.trim_matches(|c: char| !c.is_alphanumeric());
        !core.is_empty() && self.affiliation_keywords.contains(&core.to_lowercase())
    }

    pub fn has_affiliation(&self, text: &str) -> bool {
        text.split_whitespace().any(|w| self.is_affiliation_word(w))
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        let core = word.trim_matches(|c: char| !c.is_alphanumeric());
        self.stopwords.contains(&core.to_lowercase())
    }
}

pub(crate) static DEFAULT_TABLES: Lazy<ExtractionTables> =
    Lazy::new(|| ParsingConfig::default().tables());

/// Builder for [`ParsingConfig`].
///
/// Accepts a string pattern for the editorial note that is compiled in
/// [`build()`](Self::build). Fails fast with `regex::Error` if it is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    noise_phrases: ListOverride<String>,
    affiliation_keywords: ListOverride<String>,
    stopwords: ListOverride<String>,
    infer_type_journals: ListOverride<String>,
    editorial_note_re: Option<String>,
    max_name_tokens: Option<usize>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Noise phrases ──

    pub fn set_noise_phrases(mut self, phrases: Vec<String>) -> Self {
        self.noise_phrases = ListOverride::Replace(phrases);
        self
    }

    pub fn add_noise_phrase(mut self, phrase: String) -> Self {
        self.noise_phrases.push(phrase);
        self
    }

    // ── Affiliation keywords ──

    pub fn set_affiliation_keywords(mut self, keywords: Vec<String>) -> Self {
        self.affiliation_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_affiliation_keyword(mut self, keyword: String) -> Self {
        self.affiliation_keywords.push(keyword);
        self
    }

    // ── Stopwords ──

    pub fn set_stopwords(mut self, words: Vec<String>) -> Self {
        self.stopwords = ListOverride::Replace(words);
        self
    }

    pub fn add_stopword(mut self, word: String) -> Self {
        self.stopwords.push(word);
        self
    }

    // ── Type inference ──

    pub fn set_infer_type_journals(mut self, journals: Vec<String>) -> Self {
        self.infer_type_journals = ListOverride::Replace(journals);
        self
    }

    pub fn add_infer_type_journal(mut self, journal: String) -> Self {
        self.infer_type_journals.push(journal);
        self
    }

    // ── Scalars ──

    pub fn editorial_note_regex(mut self, pattern: &str) -> Self {
        self.editorial_note_re = Some(pattern.to_string());
        self
    }

    pub fn max_name_tokens(mut self, n: usize) -> Self {
        self.max_name_tokens = Some(n);
        self
    }

    /// Layer the `[extraction]` section of a config file on top of this builder.
    pub fn apply_file_config(mut self, file: &ExtractionConfig) -> Self {
        for phrase in file.extra_noise_phrases.iter().flatten() {
            self = self.add_noise_phrase(phrase.clone());
        }
        for keyword in file.extra_affiliation_keywords.iter().flatten() {
            self = self.add_affiliation_keyword(keyword.clone());
        }
        for word in file.extra_stopwords.iter().flatten() {
            self = self.add_stopword(word.clone());
        }
        if let Some(journals) = &file.infer_type_journals {
            self = self.set_infer_type_journals(journals.clone());
        }
        if let Some(pattern) = &file.editorial_note_pattern {
            self = self.editorial_note_regex(pattern);
        }
        if let Some(n) = file.max_name_tokens {
            self = self.max_name_tokens(n);
        }
        self
    }

    /// Compile the pattern and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        Ok(ParsingConfig {
            noise_phrases: self.noise_phrases,
            affiliation_keywords: self.affiliation_keywords,
            stopwords: self.stopwords,
            infer_type_journals: self.infer_type_journals,
            editorial_note_re: self.editorial_note_re.map(|p| Regex::new(&p)).transpose()?,
            max_name_tokens: self.max_name_tokens.unwrap_or(DEFAULT_MAX_NAME_TOKENS),
        })
    }
}

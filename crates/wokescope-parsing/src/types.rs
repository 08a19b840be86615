use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use wokescope_core::TypeCategory;

use crate::config::ParsingConfig;

/// Raw `type` values that mean "not recorded".
const PLACEHOLDER_TYPES: &[&str] = &["", "nan", "n/a", "na", "-", "none", "null"];

/// Patterns over the scraped type label, highest priority first.
static RAW_TYPE_PATTERNS: Lazy<Vec<(TypeCategory, Regex)>> = Lazy::new(|| {
    [
        (TypeCategory::Tutorial, r"(?i)\btutorial"),
        (
            TypeCategory::ResearchNote,
            r"(?i)\bnotes?\b|\bshort\s+(?:paper|article|communication)\b|\bbrief\b|\bletter\b",
        ),
        (
            TypeCategory::Commentary,
            r"(?i)\bcommentar|\bcomment\b|\bforum\b|\bdebate|\bperspective|\bdialogue|\breply\b|\brejoinder|\bresponse\b|\beditorial|\bessay|\bpoint\s+of\s+view",
        ),
        (
            TypeCategory::Review,
            r"(?i)\breview\b|\bsurvey\b|\bmeta-?analy|\boverview\b",
        ),
        (
            TypeCategory::ResearchArticle,
            r"(?i)\bresearch\b|\barticles?\b|\bpaper\b|\bspecial\s+issue|\boriginal\b|\bregular\b|\bfull[\s-]length|\bempirical",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
    .collect()
});

/// Patterns over title + abstract, used only when the type is missing.
static INFERENCE_PATTERNS: Lazy<Vec<(TypeCategory, Regex)>> = Lazy::new(|| {
    [
        (
            TypeCategory::Tutorial,
            r"(?i)\btutorial\b|\ba\s+primer\b|\bhow\s+to\s+(?:use|conduct|estimate|implement)\b",
        ),
        (
            TypeCategory::ResearchNote,
            r"(?i)\bresearch\s+note\b|\btechnical\s+note\b|\b(?:in\s+)?this\s+note\b",
        ),
        (
            TypeCategory::Commentary,
            r"(?i)\bcommentary\b|\bwe\s+comment\s+on\b|\brejoinder\b|\breply\s+to\b|\bresponse\s+to\b|\bdebate\b|\beditorial\b",
        ),
        (
            TypeCategory::Review,
            r"(?i)\bliterature\s+review\b|\bsystematic\s+review\b|\breview\s+of\s+the\s+literature\b|\bmeta-?analy|\bsurvey\s+of\b|\bwe\s+review\b",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
    .collect()
});

pub fn is_placeholder_type(raw_type: &str) -> bool {
    let t = raw_type.trim().to_lowercase();
    PLACEHOLDER_TYPES.contains(&t.as_str())
}

/// Maps scraped article types into the closed [`TypeCategory`] set.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    infer_journals: HashSet<String>,
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeClassifier {
    pub fn new() -> Self {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> Self {
        Self {
            infer_journals: config.tables().infer_type_journals,
        }
    }

    /// Classify a row's type.
    ///
    /// A recorded type is matched against the label patterns (no match gives
    /// [`TypeCategory::Other`]). A missing type is inferred from the text only
    /// for journals known to omit it; elsewhere it stays
    /// [`TypeCategory::Unknown`].
    pub fn classify(&self, raw_type: &str, title: &str, abstract_text: &str, journal: &str) -> TypeCategory {
        if !is_placeholder_type(raw_type) {
            return first_match(&RAW_TYPE_PATTERNS, raw_type).unwrap_or(TypeCategory::Other);
        }
        if !self.infer_journals.contains(&journal.trim().to_uppercase()) {
            return TypeCategory::Unknown;
        }
        let text = format!("{title} {abstract_text}");
        first_match(&INFERENCE_PATTERNS, &text).unwrap_or(TypeCategory::ResearchArticle)
    }
}

fn first_match(patterns: &[(TypeCategory, Regex)], text: &str) -> Option<TypeCategory> {
    patterns
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str, title: &str, abs: &str, journal: &str) -> TypeCategory {
        TypeClassifier::new().classify(raw, title, abs, journal)
    }

    #[test]
    fn test_raw_type_priority() {
        assert_eq!(classify("Tutorial Review", "", "", "AMJ"), TypeCategory::Tutorial);
        assert_eq!(classify("Research Note", "", "", "AMJ"), TypeCategory::ResearchNote);
        assert_eq!(classify("Commentary", "", "", "AMJ"), TypeCategory::Commentary);
        assert_eq!(classify("Review Article", "", "", "AMJ"), TypeCategory::Review);
        assert_eq!(classify("Research Article", "", "", "AMJ"), TypeCategory::ResearchArticle);
        assert_eq!(classify("Special Issue Paper", "", "", "AMJ"), TypeCategory::ResearchArticle);
        assert_eq!(classify("Erratum", "", "", "AMJ"), TypeCategory::Other);
    }

    #[test]
    fn test_inference_gated_by_journal() {
        assert_eq!(
            classify("", "A Meta-Analysis of Platform Effects", "", "MS"),
            TypeCategory::Review
        );
        assert_eq!(
            classify("", "Some title", "Some abstract", "AMJ"),
            TypeCategory::Unknown
        );
        assert_eq!(classify("nan", "Some title", "Some abstract", "ms"), TypeCategory::ResearchArticle);
        assert_eq!(classify(" N/A ", "", "In this note we show", "OR"), TypeCategory::ResearchNote);
    }

    #[test]
    fn test_configured_allow_list() {
        let config = crate::ParsingConfigBuilder::new()
            .set_infer_type_journals(vec!["AMJ".into()])
            .build()
            .unwrap();
        let classifier = TypeClassifier::with_config(&config);
        assert_eq!(classifier.classify("", "A tutorial", "", "AMJ"), TypeCategory::Tutorial);
        assert_eq!(classifier.classify("", "A tutorial", "", "MS"), TypeCategory::Unknown);
    }

    #[test]
    fn test_placeholders() {
        for p in ["", "nan", "NaN", "n/a", "-", "None"] {
            assert!(is_placeholder_type(p));
        }
        assert!(!is_placeholder_type("Article"));
    }
}

//! Journal acronym lookup.

const JOURNAL_FULL_NAMES: &[(&str, &str)] = &[
    ("AMJ", "Academy of Management Journal"),
    ("AMR", "Academy of Management Review"),
    ("ASQ", "Administrative Science Quarterly"),
    ("ISR", "Information Systems Research"),
    ("JAE", "Journal of Accounting and Economics"),
    ("JAR", "Journal of Accounting Research"),
    ("JCR", "Journal of Consumer Research"),
    ("JF", "Journal of Finance"),
    ("JFE", "Journal of Financial Economics"),
    ("JIBS", "Journal of International Business Studies"),
    ("JM", "Journal of Marketing"),
    ("JMR", "Journal of Marketing Research"),
    ("JOC", "INFORMS Journal on Computing"),
    ("JOM", "Journal of Operations Management"),
    ("MISQ", "MIS Quarterly"),
    ("MKS", "Marketing Science"),
    ("MS", "Management Science"),
    ("MSOM", "Manufacturing & Service Operations Management"),
    ("OR", "Operations Research"),
    ("OS", "Organization Science"),
    ("POM", "Production and Operations Management"),
    ("RFS", "Review of Financial Studies"),
    ("SMJ", "Strategic Management Journal"),
    ("TAR", "The Accounting Review"),
];

/// Full name for a journal acronym (case-insensitive). Unknown codes come
/// back trimmed but otherwise unchanged.
pub fn journal_full_name(code: &str) -> String {
    let code = code.trim();
    let key = code.to_uppercase();
    JOURNAL_FULL_NAMES
        .iter()
        .find(|(acronym, _)| *acronym == key)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Every known journal acronym.
pub fn known_journals() -> impl Iterator<Item = &'static str> {
    JOURNAL_FULL_NAMES.iter().map(|(acronym, _)| *acronym)
}

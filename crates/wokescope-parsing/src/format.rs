//! Display formatting for accepted name tokens.

/// Role of a token inside a candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `J.`, `J.R.`, `J.-P.`
    Initial,
    /// A capitalized name word (or a lowercase word kept between two names).
    Core,
    /// Lowercase surname connector: `van`, `de`, `al`.
    Particle,
    /// `Jr.`, `Sr.`, `II`..`VI`. Always last.
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameToken {
    pub text: String,
    pub kind: TokenKind,
}

impl NameToken {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Render an accepted token list as a display name.
pub fn format_name(tokens: &[NameToken]) -> String {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| match token.kind {
            TokenKind::Initial => format_initial(&token.text),
            TokenKind::Suffix => format_suffix(&token.text),
            TokenKind::Particle if i > 0 => token.text.to_lowercase(),
            _ => format_word(&token.text),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `j.r` → `J.R.`; hyphens between initials are kept.
pub fn format_initial(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if c.is_alphabetic() {
            out.extend(c.to_uppercase());
            out.push('.');
        } else if c == '-' {
            out.push('-');
        }
    }
    out
}

pub fn format_suffix(text: &str) -> String {
    let bare = text.trim_end_matches('.');
    match bare.to_lowercase().as_str() {
        "jr" => "Jr.".to_string(),
        "sr" => "Sr.".to_string(),
        _ => bare.to_uppercase(),
    }
}

/// Title-case a name word unless it is already mixed case (`McDonald`).
///
/// Each hyphen- or apostrophe-delimited segment is capitalized separately.
pub fn format_word(text: &str) -> String {
    let has_upper = text.chars().any(char::is_uppercase);
    let has_lower = text.chars().any(char::is_lowercase);
    if has_upper && has_lower {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut at_segment_start = true;
    for c in text.chars() {
        if at_segment_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            at_segment_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
        if c == '-' || c == '\'' {
            at_segment_start = true;
        }
    }
    out
}

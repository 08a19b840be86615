//! Parsing of the serialized `keywords` column.
//!
//! The column arrives as a JSON array, a Python-repr list with single
//! quotes, or a flat `;`/`,`/`|` separated string. Every form yields the same
//! lowercased, deduplicated list.

use std::collections::HashSet;

use serde_json::Value;

/// Parse a keyword column value.
///
/// Bracketed text is tried as JSON, then as JSON with `'` swapped for `"`,
/// then split on commas outside double quotes. Anything else is split on
/// `;`, `,` and `|`. Never fails; unusable input gives an empty list.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let text = raw.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("nan") || text == "[]" {
        return Vec::new();
    }

    if text.starts_with('[') && text.ends_with(']') {
        if let Some(items) = json_list(text) {
            return normalize(items);
        }
        if let Some(items) = json_list(&text.replace('\'', "\"")) {
            return normalize(items);
        }
        return normalize(split_unquoted_commas(&text[1..text.len() - 1]));
    }

    normalize(text.split([';', ',', '|']).map(str::to_string))
}

/// Parse a keyword value that may already be structured (JSON input).
pub fn parse_keywords_value(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => normalize(items.iter().map(scalar_text)),
        Value::String(s) => parse_keywords(s),
        other => parse_keywords(&other.to_string()),
    }
}

/// Sorted, deduplicated JSON array text for a keyword list.
///
/// Feeding the result back through [`parse_keywords`] returns the same
/// sorted list.
pub fn canonical_keywords(keywords: &[String]) -> String {
    let mut sorted = normalize(keywords.iter().cloned());
    sorted.sort();
    serde_json::to_string(&sorted).unwrap_or_else(|_| "[]".to_string())
}

fn json_list(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(items.iter().map(scalar_text).collect()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Split on commas that sit outside a double-quoted run.
fn split_unquoted_commas(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| {
            item.as_ref()
                .to_lowercase()
                .trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
                .to_string()
        })
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

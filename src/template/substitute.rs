use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

use crate::record::Renderable;

/// Rewrite a static template by literal token replacement.
///
/// The template is scanned once, so text a field inserts is never searched
/// for further tokens. When a record lists a token twice the first entry
/// wins. Tokens present in the template but unknown to the record are left
/// verbatim, which makes a record/template mismatch visible in the output.
pub fn substitute(text: &str, record: &dyn Renderable) -> String {
    let mut values: FxHashMap<&str, String> = FxHashMap::default();
    for field in record.presentation_fields() {
        if text.contains(field.token) {
            values.entry(field.token).or_insert(field.value);
        }
    }
    if values.is_empty() {
        return text.to_string();
    }

    // Longest first so a token that prefixes another cannot shadow it.
    let mut tokens: Vec<&str> = values.keys().copied().collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let pattern = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(text, |caps: &Captures| {
                values.get(&caps[0]).cloned().unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned(),
        // Escaped literals always compile; fall back to the original text.
        Err(_) => text.to_string(),
    }
}

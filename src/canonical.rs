//! Comparable keys and fuzzy similarity for course names.

use itertools::Itertools;

/// Lowercases, keeps `[a-z0-9 ]`, and collapses whitespace.
///
/// Names written entirely outside that alphabet would all share the empty
/// key, so those fall back to their lowercased, whitespace-collapsed form.
pub fn normalize_key(label: &str) -> String {
    let lower = label.to_lowercase();
    let key = lower
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .join(" ");
    if key.is_empty() {
        lower.split_whitespace().join(" ")
    } else {
        key
    }
}

/// Jaro-Winkler similarity of two keys, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

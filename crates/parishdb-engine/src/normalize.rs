//! Text normalization for identity keys.
//!
//! Trivial textual variants of the same place name must collapse to one key
//! before any dedup comparison: "Saint Mark Coptic Orthodox Church" and
//! "St. Mark Coptic Church" are the same parish.

/// Normalizes a place name for identity comparison.
///
/// Lowercases, rewrites "saint" to "st" and "&" to "and", drops punctuation,
/// strips the profile's boilerplate words, and collapses whitespace.
#[must_use]
pub fn normalize_name(name: &str, boilerplate_words: &[&str]) -> String {
    let lowered = name.to_lowercase().replace('&', " and ");

    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|w| if w == "saint" { "st" } else { w })
        .filter(|w| !boilerplate_words.contains(w))
        .collect();

    words.join(" ")
}

/// The street-level prefix of a formatted address: everything before the
/// first comma, lowercased and trimmed. Empty when no address is known.
#[must_use]
pub fn street_prefix(formatted_address: Option<&str>) -> String {
    formatted_address
        .and_then(|a| a.split(',').next())
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default()
}

/// A coordinate rendered at fingerprint precision: five decimal places,
/// roughly one meter. Missing coordinates render as the empty string so an
/// entity without geometry still fingerprints deterministically.
#[must_use]
pub fn coordinate_key(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.5}")).unwrap_or_default()
}

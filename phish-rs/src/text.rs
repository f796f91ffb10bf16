//! Text normalization
//!
//! Maps raw email text to the cleaned form the classifier is trained on:
//! lowercase ASCII letters separated by single spaces.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw email text.
///
/// Missing text becomes an empty string. Digits, punctuation and any
/// non-Latin letters are dropped, so the result only ever contains `a`-`z`
/// and single spaces. Idempotent.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let lowered = text.to_lowercase();
    let letters = NON_LETTER.replace_all(&lowered, "");
    WHITESPACE.replace_all(&letters, " ").trim().to_string()
}

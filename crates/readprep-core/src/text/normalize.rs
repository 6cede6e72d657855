//! Normalization of raw OCR text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Punctuation that survives normalization.
const KEPT_PUNCTUATION: &[char] = &['.', ',', '?', '!', '(', ')'];

/// Whether `c` is one of the dash-like characters unified to `-`.
pub fn is_dash(c: char) -> bool {
    matches!(
        c,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}'
    )
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c)
}

/// Clean raw OCR output.
///
/// Dash runs collapse to a single `-`, characters other than alphanumerics,
/// whitespace and `. , ? ! ( )` are dropped (the hyphen included), whitespace
/// runs collapse to one space, and the result is trimmed.
///
/// Filtering happens before whitespace collapse so that removing a character
/// never leaves a double space behind; this keeps the function idempotent.
pub fn normalize(raw: &str) -> String {
    let mut unified = String::with_capacity(raw.len());
    let mut in_dash_run = false;
    for c in raw.chars() {
        if is_dash(c) {
            if !in_dash_run {
                unified.push('-');
            }
            in_dash_run = true;
        } else {
            unified.push(c);
            in_dash_run = false;
        }
    }

    let filtered: String = unified.chars().filter(|&c| is_kept(c)).collect();

    WHITESPACE_RUN.replace_all(&filtered, " ").trim().to_string()
}

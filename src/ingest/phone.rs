//! Phone number normalization
//!
//! Canonical form: digits only, prefixed with a single `+`. Normalization is
//! purely syntactic — no country-code inference and no per-country length
//! rules. Validation keeps the historical threshold of 10 characters
//! (the `+` plus at least 9 digits).

/// Minimum length of a valid normalized phone, `+` included.
pub const MIN_NORMALIZED_LEN: usize = 10;

/// Normalize a raw phone value to canonical international form.
///
/// Strips every character except digits, then prepends `+`. An input with no
/// digits at all normalizes to the empty string rather than a bare `+`.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    format!("+{}", digits)
}

/// Whether a normalized phone passes validation.
pub fn is_valid(normalized: &str) -> bool {
    !normalized.is_empty() && normalized.len() >= MIN_NORMALIZED_LEN
}

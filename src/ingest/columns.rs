//! Column resolution for user-authored spreadsheets
//!
//! Source files come from end users and header labels are inconsistent:
//! case variants and Arabic labels both appear in the wild. Each logical
//! field carries an ordered list of candidate header keys, tried in
//! sequence against the row bag.

use std::collections::HashMap;

/// A single data row keyed by header label. Only non-empty trimmed cell
/// values are present, so a missing key and an empty cell read the same.
pub type RowBag = HashMap<String, String>;

/// Candidate header labels for the contact name.
pub const NAME_KEYS: &[&str] = &["name", "Name", "NAME", "الاسم"];

/// Candidate header labels for the phone number.
pub const PHONE_KEYS: &[&str] = &["phone", "Phone", "PHONE", "رقم الهاتف", "الرقم"];

/// Candidate header labels for the email address.
pub const EMAIL_KEYS: &[&str] = &["email", "Email", "EMAIL", "البريد"];

/// Return the first candidate key present in the row, in candidate order.
pub fn first_present<'a>(row: &'a RowBag, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|key| row.get(*key).map(String::as_str))
}

//! Contact types

use serde::{Deserialize, Serialize};

/// One validated row of ingested spreadsheet data.
///
/// `phone` is always in canonical form: digits only with a single leading `+`.
/// `email` is omitted from serialized output when the source column is absent,
/// so downstream requests never carry empty values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Outcome of parsing a contact spreadsheet.
///
/// `errors` holds one human-readable message per rejected row and is omitted
/// entirely when every row validated. A file yielding zero valid contacts is
/// a parse failure, never an empty `ParseResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub contacts: Vec<ContactRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ParseResult {
    /// Number of rejected rows.
    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, |e| e.len())
    }
}

/// Contact entity as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Request to create a single contact (manual add path).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Server-reported upload status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub has_uploaded: bool,
    pub contacts_count: i64,
}

impl UploadStatus {
    /// Whether the server currently holds any contacts.
    pub fn has_contacts(&self) -> bool {
        self.has_uploaded && self.contacts_count > 0
    }
}

/// Request to create contacts in bulk from a parsed spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub contacts: Vec<ContactRecord>,
}

/// Response wrapper for contact list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListResponse {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Summary of a completed bulk upload, shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub file_name: String,
    pub imported_count: usize,
    pub rejected_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_errors: Option<Vec<String>>,
}

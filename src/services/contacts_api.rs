//! Contacts API client
//!
//! Thin REST client for the backend contact endpoints. The wizard talks to
//! it through the `ContactsBackend` trait so gate behavior can be exercised
//! against a recording mock.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    BulkCreateRequest, Contact, ContactListResponse, ContactRecord, CreateContactRequest,
    UploadStatus,
};

/// A failed call to the contacts API. Server-reported messages pass through
/// verbatim; transport failures collapse to a generic connectivity message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),
}

/// Error body shape the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// The contacts API surface the wizard depends on.
#[async_trait]
pub trait ContactsBackend: Send + Sync {
    /// GET /contacts/upload-status
    async fn upload_status(&self) -> Result<UploadStatus, ApiError>;

    /// Replace the whole server contact set: bulk delete, then bulk create.
    async fn replace_all(&self, contacts: &[ContactRecord]) -> Result<(), ApiError>;

    /// DELETE /contacts
    async fn delete_all(&self) -> Result<(), ApiError>;

    /// POST /contacts — manual single add.
    async fn create_contact(&self, request: &CreateContactRequest) -> Result<Contact, ApiError>;

    /// GET /contacts
    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError>;
}

/// HTTP implementation of `ContactsBackend`.
pub struct ContactsApi {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ContactsApi {
    /// Create a new client. `base_url` should include the API prefix,
    /// e.g. `https://api.wablast.app/api`.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("WaBlast-CLI/0.3")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a response to the API error taxonomy: pass the server's own
    /// message through when its body carries one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| "An error occurred".to_string()),
            Err(_) => "An error occurred".to_string(),
        };

        Err(ApiError::Server { status, message })
    }
}

#[async_trait]
impl ContactsBackend for ContactsApi {
    async fn upload_status(&self) -> Result<UploadStatus, ApiError> {
        let response = self
            .request(Method::GET, "/contacts/upload-status")
            .send()
            .await
            .map_err(ApiError::Network)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Network)
    }

    async fn replace_all(&self, contacts: &[ContactRecord]) -> Result<(), ApiError> {
        self.delete_all().await?;

        let body = BulkCreateRequest {
            contacts: contacts.to_vec(),
        };
        let response = self
            .request(Method::POST, "/contacts/bulk")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::Network)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, "/contacts")
            .send()
            .await
            .map_err(ApiError::Network)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn create_contact(&self, request: &CreateContactRequest) -> Result<Contact, ApiError> {
        let response = self
            .request(Method::POST, "/contacts")
            .json(request)
            .send()
            .await
            .map_err(ApiError::Network)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Network)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let response = self
            .request(Method::GET, "/contacts")
            .send()
            .await
            .map_err(ApiError::Network)?;

        let body: ContactListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Network)?;
        Ok(body.contacts)
    }
}

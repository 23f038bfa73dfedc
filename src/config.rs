//! Configuration management

use std::path::PathBuf;

use anyhow::Result;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the WaBlast backend API, including the `/api` prefix
    pub api_url: String,

    /// Bearer token for authenticated endpoints (optional for local dev)
    pub api_token: Option<String>,

    /// Directory for device-local state: upload-gate flags and logs
    pub state_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let api_url = std::env::var("WABLAST_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string());

        let api_token = std::env::var("WABLAST_API_TOKEN").ok().filter(|t| !t.is_empty());

        let state_dir = match std::env::var("WABLAST_STATE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".wablast"))
                .unwrap_or_else(|_| PathBuf::from(".wablast")),
        };

        Ok(Self {
            api_url,
            api_token,
            state_dir,
        })
    }
}

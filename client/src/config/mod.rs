//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the API base URL, request timeout, and the location of the durable
//! session file.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub session_file: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("CLINIC_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());

        let request_timeout_seconds = env::var("CLINIC_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("CLINIC_REQUEST_TIMEOUT_SECONDS must be a valid number")?;

        let session_file = env::var("CLINIC_SESSION_FILE")
            .unwrap_or_else(|_| "~/.clinic-client/session.json".to_string());
        let session_file = expanduser::expanduser(&session_file)
            .context("CLINIC_SESSION_FILE could not be expanded")?;

        Ok(Config {
            api_base_url,
            request_timeout_seconds,
            session_file,
        })
    }
}

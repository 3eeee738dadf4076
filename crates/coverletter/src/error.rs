//! Error types for cover letter generation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching the job posting
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request did not complete within the fetch timeout
    #[error("Request timed out: server did not respond within {0} seconds")]
    Timeout(u64),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Other request error
    #[error("Request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout_secs)
        } else if err.is_connect() {
            FetchError::Connect(err)
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Errors raised while reading the CV document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// CV path does not exist
    #[error("CV file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File exists but is not a readable PDF
    #[error("Failed to parse PDF {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

/// Errors raised by the completion endpoint
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Transport-level failure
    #[error("Completion request failed")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the chat completion shape
    #[error("Invalid completion response")]
    Parse(#[from] serde_json::Error),

    /// No usable content in the response
    #[error("Completion returned empty content")]
    EmptyResponse,
}

/// Errors raised while resolving configuration and static inputs
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Credential variable unset or empty
    #[error("Missing {0} in environment.")]
    MissingApiKey(&'static str),

    /// Guideline template file is absent
    #[error("Guidelines template not found: {}", .0.display())]
    GuidelinesNotFound(PathBuf),

    /// Model identifier is blank
    #[error("Invalid model name: must not be empty")]
    InvalidModel,
}

/// Top-level error returned by the generator
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// Reading the guidelines or writing the cover letter failed
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors the user fixes by changing inputs or environment
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Document(DocumentError::NotFound(_))
        )
    }
}

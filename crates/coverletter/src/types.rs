//! Core types for cover letter generation

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Model used when none is given
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Models advertised in CLI help. Other identifiers are passed through as-is.
pub const KNOWN_MODELS: &[&str] = &["gpt-5", "gpt-5-mini", "gpt-5-nano"];

/// Completion model identifier, normalized to lowercase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(String);

impl ModelName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the model is one of [`KNOWN_MODELS`]
    pub fn is_known(&self) -> bool {
        KNOWN_MODELS.contains(&self.0.as_str())
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_string())
    }
}

impl FromStr for ModelName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidModel);
        }
        Ok(Self(name.to_lowercase()))
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How extracted job content is rendered into the prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobFormat {
    /// Readability markup, unconverted
    #[default]
    Html,
    /// Markdown conversion of the readability markup
    Markdown,
    /// Plain text conversion of the readability markup
    Text,
}

impl std::fmt::Display for JobFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobFormat::Html => write!(f, "html"),
            JobFormat::Markdown => write!(f, "markdown"),
            JobFormat::Text => write!(f, "text"),
        }
    }
}

/// Readable content extracted from a job posting page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDescription {
    /// The fetched URL
    pub url: String,
    /// Page `<title>`, if any
    pub title: Option<String>,
    /// Extracted content, rendered per [`JobFormat`]
    pub content: String,
}

/// Page-ordered text of a CV document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CvText {
    /// Number of pages read
    pub page_count: usize,
    /// Page texts joined with `\n`
    pub text: String,
}

/// One generation run
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// URL of the job posting
    pub job_url: String,
    /// Path to the CV PDF
    pub cv_path: PathBuf,
    /// Free-form extra information for the prompt
    pub extra_info: String,
    /// Completion model
    pub model: ModelName,
}

impl GenerationRequest {
    /// Create a new request with default model and no extra info
    pub fn new(job_url: impl Into<String>, cv_path: impl AsRef<Path>) -> Self {
        Self {
            job_url: job_url.into(),
            cv_path: cv_path.as_ref().to_path_buf(),
            extra_info: String::new(),
            model: ModelName::default(),
        }
    }

    /// Set extra info
    pub fn extra_info(mut self, extra: impl Into<String>) -> Self {
        self.extra_info = extra.into();
        self
    }

    /// Set the completion model
    pub fn model(mut self, model: ModelName) -> Self {
        self.model = model;
        self
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct CoverLetter {
    /// Generated text, trimmed
    pub text: String,
    /// File the text was written to
    pub output_path: PathBuf,
    /// Model that produced it
    pub model: ModelName,
}

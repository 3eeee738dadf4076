//! CoverLetter - cover letter drafting from a job posting and a CV
//!
//! A run fetches the job posting, extracts the readable part of the page,
//! reads the candidate CV from a PDF, combines both with a guideline
//! template and asks a chat completion model to write the letter. The
//! result is saved to a plain-text file.
//!
//! ## Pipeline
//!
//! [`Generator`] drives the run in a fixed order and reports progress
//! through [`Status`] updates. The completion backend is pluggable via
//! [`ChatClient`]; [`OpenAiClient`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod completion;
mod config;
mod convert;
mod document;
mod error;
pub mod fetcher;
mod generator;
mod html;
mod prompt;
pub mod readability;
mod types;

pub use completion::{ChatClient, OpenAiClient};
pub use config::{Config, API_BASE_VAR, API_KEY_VAR, DEFAULT_API_BASE};
pub use convert::{html_to_markdown, html_to_text};
pub use document::read_cv_text;
pub use error::{CompletionError, ConfigError, DocumentError, Error, FetchError};
pub use fetcher::{extract_job_description, fetch_job_description, FetchOptions};
pub use generator::{
    Generator, GeneratorBuilder, Phase, Status, DEFAULT_GUIDELINES_PATH, DEFAULT_OUTPUT_PATH,
};
pub use prompt::{compose_prompt, load_guidelines};
pub use types::{
    CoverLetter, CvText, GenerationRequest, JobDescription, JobFormat, ModelName, DEFAULT_MODEL,
    KNOWN_MODELS,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns CoverLetter/1.0";

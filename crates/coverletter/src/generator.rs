//! Generator builder and run sequence

use crate::completion::ChatClient;
use crate::document::{ensure_exists, read_cv_text};
use crate::error::Error;
use crate::fetcher::{fetch_job_description, FetchOptions};
use crate::prompt::{compose_prompt, load_guidelines};
use crate::types::{CoverLetter, GenerationRequest, JobFormat};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Guideline template read when none is configured
pub const DEFAULT_GUIDELINES_PATH: &str = "prompt.txt";

/// Cover letter destination when none is configured
pub const DEFAULT_OUTPUT_PATH: &str = "cover-letter.txt";

/// Step of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Fetch,
    Extract,
    Generate,
    Save,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::Fetch => "fetch",
            Phase::Extract => "extract",
            Phase::Generate => "generate",
            Phase::Save => "save",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Progress update during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub message: String,
}

impl Status {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}

/// Builder for configuring the generator
#[derive(Debug, Clone)]
pub struct GeneratorBuilder {
    fetch: FetchOptions,
    guidelines_path: PathBuf,
    output_path: PathBuf,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            fetch: FetchOptions::default(),
            guidelines_path: PathBuf::from(DEFAULT_GUIDELINES_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }

    /// Set custom User-Agent for the job page request
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.fetch.user_agent = Some(ua.into());
        self
    }

    /// Set the job page request timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.timeout = timeout;
        self
    }

    /// Set how the job description is rendered into the prompt
    pub fn job_format(mut self, format: JobFormat) -> Self {
        self.fetch.format = format;
        self
    }

    /// Set the guideline template path
    pub fn guidelines_path(mut self, path: impl AsRef<Path>) -> Self {
        self.guidelines_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the cover letter output path
    pub fn output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = path.as_ref().to_path_buf();
        self
    }

    /// Build the generator around a completion client
    pub fn build(self, client: impl ChatClient + 'static) -> Generator {
        Generator {
            fetch: self.fetch,
            guidelines_path: self.guidelines_path,
            output_path: self.output_path,
            client: Box::new(client),
        }
    }
}

/// Configured cover letter generator
pub struct Generator {
    fetch: FetchOptions,
    guidelines_path: PathBuf,
    output_path: PathBuf,
    client: Box<dyn ChatClient>,
}

impl Generator {
    /// Create a new generator builder
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run the full sequence
    pub async fn generate(&self, req: &GenerationRequest) -> Result<CoverLetter, Error> {
        self.generate_with_status(req, |_| {}).await
    }

    /// Run the full sequence with status updates
    ///
    /// The CV path is checked before any network request. The output file
    /// is written only after every earlier step succeeded.
    pub async fn generate_with_status<F>(
        &self,
        req: &GenerationRequest,
        mut status_callback: F,
    ) -> Result<CoverLetter, Error>
    where
        F: FnMut(Status),
    {
        status_callback(Status::new(Phase::Start, "Starting cover-letter-cli..."));
        ensure_exists(&req.cv_path)?;

        status_callback(Status::new(Phase::Fetch, "Fetching job information..."));
        let job = fetch_job_description(&req.job_url, &self.fetch).await?;

        status_callback(Status::new(Phase::Extract, "Extracting CV information..."));
        let cv = read_cv_text(&req.cv_path)?;

        let guidelines = load_guidelines(&self.guidelines_path)?;
        let prompt = compose_prompt(&guidelines, &job.content, &cv.text, &req.extra_info);

        status_callback(Status::new(
            Phase::Generate,
            format!("Generating cover letter using model: {} ...", req.model),
        ));
        let text = self.client.complete(&req.model, &prompt).await?;

        status_callback(Status::new(Phase::Save, "Saving cover letter..."));
        std::fs::write(&self.output_path, &text).map_err(|source| Error::Io {
            path: self.output_path.clone(),
            source,
        })?;
        info!(
            path = %self.output_path.display(),
            chars = text.len(),
            "Cover letter written"
        );

        status_callback(Status::new(
            Phase::Done,
            format!("Cover letter saved to {}", self.output_path.display()),
        ));

        Ok(CoverLetter {
            text,
            output_path: self.output_path.clone(),
            model: req.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompletionError, DocumentError};
    use crate::types::ModelName;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingClient {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChatClient for CountingClient {
        async fn complete(
            &self,
            _model: &ModelName,
            _prompt: &str,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("letter".to_string())
        }
    }

    #[test]
    fn test_builder_defaults() {
        let builder = GeneratorBuilder::new();
        assert_eq!(builder.guidelines_path, PathBuf::from("prompt.txt"));
        assert_eq!(builder.output_path, PathBuf::from("cover-letter.txt"));
        assert_eq!(builder.fetch.timeout, Duration::from_secs(10));
        assert_eq!(builder.fetch.format, JobFormat::Html);
    }

    #[test]
    fn test_builder_options() {
        let builder = Generator::builder()
            .user_agent("TestAgent/1.0")
            .fetch_timeout(Duration::from_secs(3))
            .job_format(JobFormat::Text)
            .guidelines_path("guides/prompt.txt")
            .output_path("out/letter.txt");

        assert_eq!(builder.fetch.user_agent, Some("TestAgent/1.0".to_string()));
        assert_eq!(builder.fetch.timeout, Duration::from_secs(3));
        assert_eq!(builder.fetch.format, JobFormat::Text);
        assert_eq!(builder.guidelines_path, PathBuf::from("guides/prompt.txt"));
        assert_eq!(builder.output_path, PathBuf::from("out/letter.txt"));
    }

    #[test]
    fn test_status() {
        let status = Status::new(Phase::Fetch, "Fetching job information...");
        assert_eq!(status.phase, Phase::Fetch);
        assert_eq!(status.message, "Fetching job information...");
        assert_eq!(Phase::Generate.to_string(), "generate");
    }

    #[tokio::test]
    async fn test_missing_cv_stops_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Generator::builder()
            .output_path(dir.path().join("letter.txt"))
            .build(CountingClient {
                calls: calls.clone(),
            });

        // Unroutable URL: reaching the fetch step would fail differently
        let req = GenerationRequest::new("http://127.0.0.1:9/job", dir.path().join("nope.pdf"));
        let mut phases = Vec::new();
        let err = generator
            .generate_with_status(&req, |s| phases.push(s.phase))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Document(DocumentError::NotFound(_))));
        assert!(err.is_config());
        assert_eq!(phases, vec![Phase::Start]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("letter.txt").exists());
    }
}

//! Job posting fetcher
//!
//! Retrieves the posting page with a single bounded GET and reduces HTML
//! to its main readable content.

use crate::convert::{html_to_markdown, html_to_text};
use crate::error::FetchError;
use crate::html::is_html;
use crate::readability;
use crate::types::{JobDescription, JobFormat};
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Total timeout for the job page request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch options that can be configured via the generator builder
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Total request timeout
    pub timeout: Duration,
    /// Rendering of the extracted content
    pub format: JobFormat,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: FETCH_TIMEOUT,
            format: JobFormat::default(),
        }
    }
}

/// Fetch a job posting and extract its readable content
///
/// Fails on timeout, connection failure, or any non-success status.
/// Partial content is never returned.
pub async fn fetch_job_description(
    url: &str,
    options: &FetchOptions,
) -> Result<JobDescription, FetchError> {
    validate_url(url)?;

    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html, application/xhtml+xml, text/plain;q=0.9, */*;q=0.8"),
    );

    let timeout_secs = options.timeout.as_secs();
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(options.timeout)
        .build()
        .map_err(FetchError::ClientBuild)?;

    debug!(url, "Fetching job posting");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    // Decoded per the Content-Type charset, UTF-8 when absent
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(e, timeout_secs))?;

    let job = extract_job_description(url, content_type.as_deref(), &body, options.format);
    info!(
        url,
        title = job.title.as_deref().unwrap_or(""),
        chars = job.content.len(),
        "Fetched job description"
    );
    Ok(job)
}

/// Reduce a fetched body to the job description
///
/// HTML goes through readability extraction and is rendered per `format`.
/// Other content passes through unchanged.
pub fn extract_job_description(
    url: &str,
    content_type: Option<&str>,
    body: &str,
    format: JobFormat,
) -> JobDescription {
    if !is_html(content_type, body) {
        debug!(url, content_type, "Non-HTML job posting, using raw body");
        return JobDescription {
            url: url.to_string(),
            title: None,
            content: body.to_string(),
        };
    }

    let article = readability::extract(body);
    let content = match format {
        JobFormat::Html => article.content,
        JobFormat::Markdown => html_to_markdown(&article.content),
        JobFormat::Text => html_to_text(&article.content),
    };

    JobDescription {
        url: url.to_string(),
        title: article.title,
        content,
    }
}

fn validate_url(url: &str) -> Result<(), FetchError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }
    Url::parse(url).map_err(|_| FetchError::InvalidUrlScheme)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><title>Data Engineer</title></head><body>\
        <nav>Home Jobs</nav>\
        <div class=\"posting\"><h2>About the role</h2>\
        <p>You will build <strong>data pipelines</strong>, dashboards, and internal tooling.</p></div>\
        </body></html>";

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert!(options.user_agent.is_none());
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.format, JobFormat::Html);
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/jobs/1").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(FetchError::InvalidUrlScheme)
        ));
        assert!(matches!(
            validate_url("example.com/jobs"),
            Err(FetchError::InvalidUrlScheme)
        ));
        assert!(matches!(
            validate_url("https://"),
            Err(FetchError::InvalidUrlScheme)
        ));
    }

    #[test]
    fn test_extract_html_format() {
        let job =
            extract_job_description("https://x.test/job", Some("text/html"), PAGE, JobFormat::Html);
        assert_eq!(job.title, Some("Data Engineer".to_string()));
        assert!(job.content.starts_with("<div>"));
        assert!(job.content.contains("<strong>data pipelines</strong>"));
        assert!(!job.content.contains("Home Jobs"));
    }

    #[test]
    fn test_extract_markdown_format() {
        let job = extract_job_description(
            "https://x.test/job",
            Some("text/html"),
            PAGE,
            JobFormat::Markdown,
        );
        assert!(job.content.contains("## About the role"));
        assert!(job.content.contains("**data pipelines**"));
        assert!(!job.content.contains('<'));
    }

    #[test]
    fn test_extract_text_format() {
        let job = extract_job_description("https://x.test/job", None, PAGE, JobFormat::Text);
        assert!(job.content.contains("About the role"));
        assert!(job.content.contains("You will build data pipelines, dashboards"));
        assert!(!job.content.contains("**"));
    }

    #[test]
    fn test_extract_non_html_passthrough() {
        let body = "Plain text posting\n\n\n\nwith gaps";
        let job = extract_job_description(
            "https://x.test/job.txt",
            Some("text/plain"),
            body,
            JobFormat::Markdown,
        );
        assert_eq!(job.content, body);
        assert!(job.title.is_none());
    }
}

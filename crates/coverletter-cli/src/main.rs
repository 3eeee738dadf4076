//! CoverLetter CLI - Command-line interface for drafting cover letters

use clap::{Parser, ValueEnum};
use coverletter::{
    Config, ConfigError, Error, GenerationRequest, Generator, JobFormat, ModelName, OpenAiClient, Phase, Status,
    DEFAULT_GUIDELINES_PATH, DEFAULT_MODEL, DEFAULT_OUTPUT_PATH,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rendering of the job description inside the prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum JobFormatArg {
    /// Readable HTML fragment
    #[default]
    Html,
    /// Markdown
    Markdown,
    /// Plain text
    Text,
}

impl From<JobFormatArg> for JobFormat {
    fn from(arg: JobFormatArg) -> Self {
        match arg {
            JobFormatArg::Html => JobFormat::Html,
            JobFormatArg::Markdown => JobFormat::Markdown,
            JobFormatArg::Text => JobFormat::Text,
        }
    }
}

/// Generate a cover letter from a job posting URL and a CV in PDF format
#[derive(Parser, Debug)]
#[command(name = "cover-letter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the job posting
    job_url: String,

    /// Path to the CV (PDF)
    cv_path: PathBuf,

    /// Extra information appended to the prompt
    #[arg(long, default_value = "")]
    extra_info: String,

    /// Completion model: gpt-5, gpt-5-mini or gpt-5-nano (case-insensitive)
    #[arg(long, default_value = DEFAULT_MODEL)]
    llm_model: ModelName,

    /// Where to write the cover letter
    #[arg(long, short, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Guideline template placed at the top of the prompt
    #[arg(long, default_value = DEFAULT_GUIDELINES_PATH)]
    guidelines: PathBuf,

    /// How the job description is rendered into the prompt
    #[arg(long, value_enum, default_value_t = JobFormatArg::Html)]
    job_format: JobFormatArg,

    /// Custom User-Agent for the job page request
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let code = run(cli, Config::from_env()).await;
    std::process::exit(code);
}

/// Run one generation and return the process exit code
async fn run(cli: Cli, config: Result<Config, ConfigError>) -> i32 {
    let config = match config {
        Ok(config) => config,
        Err(e) => return report(&Error::from(e)),
    };

    if !cli.llm_model.is_known() {
        tracing::warn!(model = %cli.llm_model, "Unrecognized model, passing through");
    }

    let client = match OpenAiClient::new(&config) {
        Ok(client) => client,
        Err(e) => return report(&Error::from(e)),
    };

    let mut builder = Generator::builder()
        .job_format(cli.job_format.into())
        .guidelines_path(&cli.guidelines)
        .output_path(&cli.output);
    if let Some(ua) = cli.user_agent {
        builder = builder.user_agent(ua);
    }
    let generator = builder.build(client);

    let request = GenerationRequest::new(cli.job_url, &cli.cv_path)
        .extra_info(cli.extra_info)
        .model(cli.llm_model);

    match generator
        .generate_with_status(&request, |status| writeln_safe(&format_status(&status)))
        .await
    {
        Ok(_) => 0,
        Err(e) => report(&e),
    }
}

/// Log to stderr so stdout carries only progress markers
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Progress marker for a status update
fn format_status(status: &Status) -> String {
    match status.phase {
        Phase::Done => format!("[✓] {}", status.message),
        _ => format!("[*] {}", status.message),
    }
}

/// Render an error for the terminal
///
/// Configuration problems get a single `[!]` line; anything else is printed
/// with its full cause chain.
fn format_error(err: &Error) -> String {
    if err.is_config() {
        return format!("[!] {}", err);
    }

    let mut output = format!("Error: {}", err);
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        output.push_str(&format!("\n  caused by: {}", cause));
        source = std::error::Error::source(cause);
    }
    output
}

/// Print `err` to stderr and return the failure exit code
fn report(err: &Error) -> i32 {
    eprintln!("{}", format_error(err));
    1
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use coverletter::{DocumentError, FetchError, API_KEY_VAR, KNOWN_MODELS};

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["cover-letter", "https://example.com/job", "cv.pdf"]).unwrap();

        assert_eq!(cli.job_url, "https://example.com/job");
        assert_eq!(cli.cv_path, PathBuf::from("cv.pdf"));
        assert_eq!(cli.extra_info, "");
        assert_eq!(cli.llm_model.as_str(), "gpt-5-nano");
        assert_eq!(cli.output, PathBuf::from("cover-letter.txt"));
        assert_eq!(cli.guidelines, PathBuf::from("prompt.txt"));
        assert_eq!(cli.job_format, JobFormatArg::Html);
        assert!(cli.user_agent.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "cover-letter",
            "https://example.com/job",
            "cv.pdf",
            "--extra-info",
            "Available from March",
            "--llm-model",
            "GPT-5-Mini",
            "--output",
            "letters/acme.txt",
            "--guidelines",
            "templates/formal.txt",
            "--job-format",
            "markdown",
            "--user-agent",
            "TestAgent/1.0",
        ])
        .unwrap();

        assert_eq!(cli.extra_info, "Available from March");
        assert_eq!(cli.llm_model.as_str(), "gpt-5-mini");
        assert_eq!(cli.output, PathBuf::from("letters/acme.txt"));
        assert_eq!(cli.guidelines, PathBuf::from("templates/formal.txt"));
        assert_eq!(JobFormat::from(cli.job_format), JobFormat::Markdown);
        assert_eq!(cli.user_agent.as_deref(), Some("TestAgent/1.0"));
    }

    #[test]
    fn test_parse_requires_positionals() {
        assert!(Cli::try_parse_from(["cover-letter", "https://example.com/job"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_job_format() {
        let result = Cli::try_parse_from([
            "cover-letter",
            "https://example.com/job",
            "cv.pdf",
            "--job-format",
            "pdf",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_lists_known_models() {
        let help = Cli::command().render_help().to_string();
        for model in KNOWN_MODELS {
            assert!(help.contains(model), "help should mention {}", model);
        }
    }

    #[test]
    fn test_format_status() {
        let status = Status::new(Phase::Fetch, "Fetching job information...");
        assert_eq!(format_status(&status), "[*] Fetching job information...");

        let status = Status::new(Phase::Done, "Cover letter saved to cover-letter.txt");
        assert_eq!(
            format_status(&status),
            "[✓] Cover letter saved to cover-letter.txt"
        );
    }

    #[test]
    fn test_format_config_error() {
        let err = Error::from(ConfigError::MissingApiKey("OPENAI_API_KEY"));
        assert_eq!(format_error(&err), "[!] Missing OPENAI_API_KEY in environment.");

        let err = Error::from(DocumentError::NotFound(PathBuf::from("cv.pdf")));
        assert_eq!(format_error(&err), "[!] CV file not found: cv.pdf");
    }

    #[test]
    fn test_format_error_with_cause_chain() {
        let err = Error::Io {
            path: PathBuf::from("cover-letter.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            format_error(&err),
            "Error: I/O error on cover-letter.txt\n  caused by: permission denied"
        );
    }

    #[test]
    fn test_format_fetch_error() {
        let err = Error::from(FetchError::HttpStatus {
            status: 404,
            url: "https://example.com/job".to_string(),
        });
        let output = format_error(&err);
        assert!(output.starts_with("Error: "));
        assert!(output.contains("404"));
    }

    fn cli_in(dir: &std::path::Path) -> Cli {
        Cli::try_parse_from([
            "cover-letter".to_string(),
            "http://127.0.0.1:9/jobs/42".to_string(),
            dir.join("cv.pdf").display().to_string(),
            "--output".to_string(),
            dir.join("cover-letter.txt").display().to_string(),
            "--guidelines".to_string(),
            dir.join("prompt.txt").display().to_string(),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_missing_api_key_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cv.pdf"), "placeholder").unwrap();

        let code = run(cli_in(dir.path()), Config::from_lookup(|_| None)).await;

        assert_eq!(code, 1);
        assert!(!dir.path().join("cover-letter.txt").exists());
    }

    #[tokio::test]
    async fn test_run_missing_cv_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lookup(|key| {
            (key == API_KEY_VAR).then(|| "sk-test".to_string())
        });

        let code = run(cli_in(dir.path()), config).await;

        assert_eq!(code, 1);
        assert!(!dir.path().join("cover-letter.txt").exists());
    }
}

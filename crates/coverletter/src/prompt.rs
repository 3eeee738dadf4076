//! Prompt composition

use crate::error::{ConfigError, Error};
use std::path::Path;

/// Label preceding the job description
pub const JOB_LABEL: &str = "Job Description:";
/// Label preceding the CV text
pub const CV_LABEL: &str = "Candidate CV:";
/// Label preceding the extra info
pub const EXTRA_LABEL: &str = "Additional Info:";

/// Build the completion prompt
///
/// Inputs are inserted verbatim, in fixed order, each section separated
/// by a blank line.
pub fn compose_prompt(guidelines: &str, job: &str, cv: &str, extra_info: &str) -> String {
    format!(
        "{guidelines}\n\n{JOB_LABEL}\n{job}\n\n{CV_LABEL}\n{cv}\n\n{EXTRA_LABEL}\n{extra_info}\n"
    )
}

/// Load the guideline template
pub fn load_guidelines(path: &Path) -> Result<String, Error> {
    if !path.exists() {
        return Err(ConfigError::GuidelinesNotFound(path.to_path_buf()).into());
    }
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

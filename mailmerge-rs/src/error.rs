use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid campaign metadata:\n{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Missing required header {0:?}: provide From and Subject in the headers field")]
    MissingRequiredHeader(String),

    #[error("Couldn't detect mimetype for {}. Does it have correct extension set?", .0.display())]
    UnresolvedAttachmentType(PathBuf),

    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("HTML post-processing failed: {0}")]
    PostProcess(String),

    #[error("Invalid header name: {0}")]
    InvalidHeader(String),

    #[error("Invalid address in {header}: {value:?}")]
    InvalidAddress { header: String, value: String },

    #[error("Message building failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Preview error: {0}")]
    Preview(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, MergeError>;

/// A single problem found while validating campaign metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location of the offending value, e.g. `recipients[1].address`
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether any issue was reported at exactly `path`
    pub fn has_path(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

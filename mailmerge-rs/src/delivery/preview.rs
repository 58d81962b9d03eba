//! Visual preview of rendered HTML

use std::io::Write;
use std::process::Command;
use tracing::{debug, warn};

use crate::error::{MergeError, Result};

/// Viewer program used when none is configured
pub const DEFAULT_VIEWER: &str = "firefox";

/// Shows a rendered message to a human and returns once they are done
#[cfg_attr(test, mockall::automock)]
pub trait Previewer {
    fn preview(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

/// Writes the preview page to a temporary `.html` file and opens it with an
/// external viewer, waiting for the viewer to exit
#[derive(Debug, Clone)]
pub struct CommandPreviewer {
    program: String,
}

impl CommandPreviewer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandPreviewer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWER)
    }
}

impl Previewer for CommandPreviewer {
    fn preview(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("mailmerge-preview-")
            .suffix(".html")
            .tempfile()?;
        file.write_all(preview_page(to, subject, html).as_bytes())?;
        file.flush()?;

        debug!("Opening preview {} with {}", file.path().display(), self.program);
        let status = Command::new(&self.program)
            .arg(file.path())
            .status()
            .map_err(|e| MergeError::Preview(format!("failed to launch {}: {}", self.program, e)))?;

        if !status.success() {
            warn!(viewer = %self.program, "Preview viewer exited with {}", status);
        }
        Ok(())
    }
}

/// Standalone page showing the destination, the subject and the body
pub fn preview_page(to: &str, subject: &str, html: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset='utf-8'/><title>E-mail preview</title></head>\
         <body><p>To: {}</p><p>{}</p><hr/>{}</body></html>",
        html_escape::encode_text(to),
        html_escape::encode_text(subject),
        html
    )
}

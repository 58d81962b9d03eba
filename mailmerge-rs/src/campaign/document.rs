//! Campaign documents: YAML frontmatter followed by the template body

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::campaign::CampaignData;
use crate::error::{MergeError, Result};

/// Extension of campaign files inside the mails directory
pub const CAMPAIGN_EXTENSION: &str = "txt";

/// A campaign file split into metadata and template source
#[derive(Debug, Clone)]
pub struct CampaignDocument {
    pub metadata: Value,
    pub body: String,
}

impl CampaignDocument {
    /// Path of the campaign called `name` inside `mails_dir`
    pub fn path(mails_dir: &Path, name: &str) -> PathBuf {
        mails_dir.join(format!("{}.{}", name, CAMPAIGN_EXTENSION))
    }

    /// Load `<mails_dir>/<name>.txt`
    pub fn load(mails_dir: &Path, name: &str) -> Result<Self> {
        let path = Self::path(mails_dir, name);
        debug!("Loading campaign from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }

    /// Split a document into frontmatter and body
    ///
    /// The frontmatter starts on the first line with a `---` delimiter and
    /// ends at the next delimiter line. A document without frontmatter has
    /// null metadata and the whole text as its body.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let mut lines = text.split_inclusive('\n');

        let Some(opening) = lines.next().filter(|line| is_delimiter(line)) else {
            return Ok(CampaignDocument {
                metadata: Value::Null,
                body: text.trim().to_string(),
            });
        };

        let start = opening.len();
        let mut offset = start;
        for line in lines {
            if is_delimiter(line) {
                let yaml = &text[start..offset];
                let body = &text[offset + line.len()..];
                let metadata = if yaml.trim().is_empty() {
                    Value::Null
                } else {
                    serde_yaml::from_str(yaml)?
                };
                return Ok(CampaignDocument {
                    metadata,
                    body: body.trim().to_string(),
                });
            }
            offset += line.len();
        }

        Err(MergeError::Config(
            "campaign frontmatter is not terminated by a '---' line".to_string(),
        ))
    }

    /// Validate the metadata into campaign data
    pub fn data(&self) -> Result<CampaignData> {
        Ok(CampaignData::from_metadata(&self.metadata)?)
    }
}

fn is_delimiter(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

//! Attachment files and their MIME types

use lettre::message::header::ContentType;
use lettre::message::{Attachment as AttachmentPart, SinglePart};
use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};

/// An attachment path whose MIME type has been resolved from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    filename: String,
    mime_type: String,
}

impl Attachment {
    /// Resolve the MIME type of `path` from its extension
    ///
    /// The file itself is not opened here.
    ///
    /// # Errors
    /// [`MergeError::UnresolvedAttachmentType`] when no type is known for the
    /// file name.
    pub fn resolve(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let unresolved = || MergeError::UnresolvedAttachmentType(path.clone());

        let mime = mime_guess::from_path(&path).first().ok_or_else(unresolved)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(unresolved)?;

        Ok(Self {
            filename,
            mime_type: mime.essence_str().to_string(),
            path,
        })
    }

    /// Resolve every path in order, stopping at the first failure
    pub fn resolve_all(paths: &[PathBuf]) -> Result<Vec<Self>> {
        paths.iter().map(Attachment::resolve).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name used as the attachment filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full type, e.g. `application/pdf`
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn main_type(&self) -> &str {
        self.split_type().0
    }

    pub fn sub_type(&self) -> &str {
        self.split_type().1
    }

    fn split_type(&self) -> (&str, &str) {
        self.mime_type
            .split_once('/')
            .unwrap_or((self.mime_type.as_str(), ""))
    }

    /// Read the file and build its MIME part
    pub fn to_part(&self) -> Result<SinglePart> {
        let content = std::fs::read(&self.path)?;
        let content_type = ContentType::parse(&format!("{}/{}", self.main_type(), self.sub_type()))
            .map_err(|_| MergeError::UnresolvedAttachmentType(self.path.clone()))?;
        Ok(AttachmentPart::new(self.filename.clone()).body(content, content_type))
    }
}

//! mailmerge-rs: Mail-merge campaign rendering and delivery
//!
//! Renders one templated campaign per recipient and submits the results
//! over a single authenticated SMTP session.
//!
//! # Features
//!
//! - **Campaigns**: YAML frontmatter (headers, attachments, recipients) plus a template body
//! - **Templates**: Jinja-style templates with markdown, rendered to HTML and plain text
//! - **HTML**: Inline styles for mail clients that ignore stylesheets
//! - **Messages**: multipart/alternative bodies with optional attachments
//! - **Delivery**: Overall and per-recipient confirmation, previews, recipient override
//!
//! # Example
//!
//! ```no_run
//! use mailmerge_rs::campaign::CampaignDocument;
//! use mailmerge_rs::config::SenderProfiles;
//! use mailmerge_rs::delivery::{CommandPreviewer, Mailer, SmtpChannel, TerminalConfirmer};
//! use mailmerge_rs::templates::TemplateRenderer;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let profiles = SenderProfiles::from_file("senderconfig.json")?;
//!     let sender = profiles.get("work").ok_or("unknown sender")?;
//!
//!     let document = CampaignDocument::load(Path::new("mails"), "spring")?;
//!     let campaign = document.data()?;
//!     let templates = TemplateRenderer::compile(&document.body, "includes")?;
//!
//!     let mut mailer = Mailer::new(
//!         &templates,
//!         SmtpChannel::new(),
//!         TerminalConfirmer::new(),
//!         CommandPreviewer::default(),
//!     );
//!     let outcome = mailer.run(&campaign, sender, true)?;
//!     std::process::exit(outcome.status().into());
//! }
//! ```
//!
//! # Modules
//!
//! - [`campaign`]: Campaign files and the validated data model
//! - [`config`]: Sender profiles
//! - [`delivery`]: Orchestrator, SMTP channel, confirmation and preview
//! - [`error`]: Error types and handling
//! - [`headers`]: Ordered header maps
//! - [`html`]: Inline style post-processing
//! - [`message`]: Message composition
//! - [`templates`]: Template compilation and rendering

pub mod campaign;
pub mod config;
pub mod delivery;
pub mod error;
pub mod headers;
pub mod html;
pub mod message;
pub mod templates;

// Re-export commonly used types
pub use campaign::{CampaignData, CampaignDocument, Recipient};
pub use config::{SenderConfig, SenderProfiles};
pub use delivery::{Mailer, RunOutcome};
pub use error::{MergeError, Result};
pub use headers::Headers;

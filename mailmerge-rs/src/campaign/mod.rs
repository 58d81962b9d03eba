//! Campaign documents and their validated data

pub mod document;
pub mod types;

pub use document::CampaignDocument;
pub use types::{CampaignData, Fields, Recipient};

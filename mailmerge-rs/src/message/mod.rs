//! Message composition: headers, alternative bodies and attachments

pub mod attachment;
pub mod composer;

pub use attachment::Attachment;
pub use composer::compose_message;

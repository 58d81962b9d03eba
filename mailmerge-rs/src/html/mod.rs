//! HTML post-processing for email-client portability

mod serialize;
pub mod styles;

pub use styles::{inline_styles, MAIN_BODY_ID};

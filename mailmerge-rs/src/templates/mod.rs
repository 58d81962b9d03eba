//! Campaign template rendering
//!
//! One template source is compiled into an HTML renderer and a text
//! renderer with the same variable bindings and includes directory.

pub mod filters;
pub mod renderer;

pub use renderer::{TemplateRenderer, DEFAULT_INCLUDES_DIR};

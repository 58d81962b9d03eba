//! Dual-mode rendering of one campaign template

use minijinja::{path_loader, AutoEscape, Environment, UndefinedBehavior};
use std::path::Path;

use crate::campaign::Fields;
use crate::error::Result;
use crate::templates::filters;

/// Directory `{% include %}` resolves partials from by default
pub const DEFAULT_INCLUDES_DIR: &str = "includes";

const CAMPAIGN_TEMPLATE: &str = "campaign";

/// Which body a renderer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    Html,
    Text,
}

/// A campaign template compiled once into an HTML and a text renderer
///
/// Both renderers bind the same variables. They differ in the `md` filter
/// (markdown conversion in HTML mode, identity in text mode) and in the
/// `txt` global, which is `true` only in text mode.
pub struct TemplateRenderer {
    html: Environment<'static>,
    text: Environment<'static>,
}

impl TemplateRenderer {
    /// Compile `source`, resolving includes from `includes_dir`
    ///
    /// # Errors
    /// Returns [`MergeError::Render`](crate::MergeError::Render) on
    /// malformed template syntax.
    pub fn compile(source: &str, includes_dir: impl AsRef<Path>) -> Result<Self> {
        let includes_dir = includes_dir.as_ref();
        Ok(Self {
            html: environment(RenderMode::Html, includes_dir, source)?,
            text: environment(RenderMode::Text, includes_dir, source)?,
        })
    }

    fn render(&self, mode: RenderMode, fields: &Fields) -> Result<String> {
        let env = match mode {
            RenderMode::Html => &self.html,
            RenderMode::Text => &self.text,
        };
        let template = env.get_template(CAMPAIGN_TEMPLATE)?;
        Ok(template.render(fields)?)
    }

    pub fn render_html(&self, fields: &Fields) -> Result<String> {
        self.render(RenderMode::Html, fields)
    }

    pub fn render_text(&self, fields: &Fields) -> Result<String> {
        self.render(RenderMode::Text, fields)
    }
}

fn environment(mode: RenderMode, includes_dir: &Path, source: &str) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_loader(path_loader(includes_dir.to_path_buf()));
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    match mode {
        RenderMode::Html => env.add_filter("md", filters::markdown),
        RenderMode::Text => env.add_filter("md", filters::passthrough),
    }
    env.add_filter("fix_newlines", filters::fix_newlines);
    env.add_global("txt", mode == RenderMode::Text);

    env.add_template_owned(CAMPAIGN_TEMPLATE, source.to_string())?;
    Ok(env)
}

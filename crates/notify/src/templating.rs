//! Minijinja template rendering for report notifications.
//!
//! The body template is either the built-in one or a file named by
//! `EMAIL_TEMPLATE_PATH`. Templates are plain strings, so a fresh
//! [`minijinja::Environment`] is created per render call.

use std::path::Path;

use serde::Serialize;

use rb_status_core::NotifyConfig;

use crate::traits::NotifyError;

/// Subject line of every report notification.
pub const SUBJECT_TEMPLATE: &str = "[{{ status }}] {{ title }}";

/// Body used when no template file is configured.
pub const DEFAULT_BODY_TEMPLATE: &str = r#"<html>
<body>
<h2>{{ title }}</h2>
<p>Status: <strong>{{ status | upper }}</strong></p>
<p>Updated: {{ updated_at }}</p>
{% if failure_detail %}<p>First failure: <code>{{ failure_detail }}</code></p>
{% endif %}<p><a href="{{ details_link }}">View details</a></p>
</body>
</html>
"#;

/// Renders notification subjects and bodies.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    body_template: String,
}

impl TemplateRenderer {
    /// Renderer using the built-in body template.
    pub fn new() -> Self {
        Self {
            body_template: DEFAULT_BODY_TEMPLATE.to_string(),
        }
    }

    /// Renderer with a custom body template. The template is syntax-checked
    /// up front.
    pub fn with_body_template(template: impl Into<String>) -> Result<Self, NotifyError> {
        let renderer = Self {
            body_template: template.into(),
        };
        renderer.validate(&renderer.body_template)?;
        Ok(renderer)
    }

    /// Load the body template from a file.
    pub fn from_file(path: &Path) -> Result<Self, NotifyError> {
        let template = std::fs::read_to_string(path).map_err(|source| NotifyError::TemplateFile {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded email template");
        Self::with_body_template(template)
    }

    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        match &config.template_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::new()),
        }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("yesno", yesno_filter);
        env
    }

    /// Render a template string with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render<S: Serialize>(&self, template_str: &str, ctx: &S) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    pub fn render_subject<S: Serialize>(&self, ctx: &S) -> Result<String, NotifyError> {
        self.render(SUBJECT_TEMPLATE, ctx)
    }

    pub fn render_body<S: Serialize>(&self, ctx: &S) -> Result<String, NotifyError> {
        self.render(&self.body_template, ctx)
    }

    /// Check that a template string parses, without evaluating it.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// `{{ passed | yesno }}` → `"yes"` / `"no"`.
fn yesno_filter(value: bool) -> String {
    let word = if value { "yes" } else { "no" };
    word.to_string()
}

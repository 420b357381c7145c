//! Theme engine
//!
//! Renders the HTML pages with Tera. The default templates are compiled
//! into the binary; a configured directory may override any of them by
//! relative name (e.g. `news/detail.html`).

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::models::User;

mod error;

pub use error::ThemeError;

/// Templates shipped with the binary, by name
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("news/home.html", include_str!("../../templates/news/home.html")),
    ("news/detail.html", include_str!("../../templates/news/detail.html")),
    ("news/comment_edit.html", include_str!("../../templates/news/comment_edit.html")),
    ("news/comment_delete.html", include_str!("../../templates/news/comment_delete.html")),
    ("notes/home.html", include_str!("../../templates/notes/home.html")),
    ("notes/list.html", include_str!("../../templates/notes/list.html")),
    ("notes/form.html", include_str!("../../templates/notes/form.html")),
    ("notes/detail.html", include_str!("../../templates/notes/detail.html")),
    ("notes/delete.html", include_str!("../../templates/notes/delete.html")),
    ("notes/success.html", include_str!("../../templates/notes/success.html")),
    ("users/login.html", include_str!("../../templates/users/login.html")),
    ("users/logged_out.html", include_str!("../../templates/users/logged_out.html")),
    ("users/signup.html", include_str!("../../templates/users/signup.html")),
];

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine from the embedded templates
    pub fn new() -> Result<Self> {
        Self::load(None)
    }

    /// Create a theme engine whose templates may be overridden from `path`
    pub fn with_overrides(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(ThemeError::NotFound(path.display().to_string()).into());
        }
        Self::load(Some(path))
    }

    fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut templates: BTreeMap<String, String> = EMBEDDED_TEMPLATES
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();

        if let Some(path) = override_path {
            let mut overrides = Vec::new();
            collect_templates_from_dir(path, path, &mut overrides)?;
            for (name, content) in overrides {
                tracing::debug!("Template '{}' overridden from {:?}", name, path);
                templates.insert(name, content);
            }
        }

        let mut tera = Tera::default();
        // Adding all at once lets Tera resolve `extends` regardless of order
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(describe_tera_error(&e)))?;

        Ok(Self { tera })
    }

    /// Render a template
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            ThemeError::TemplateError(format!(
                "Failed to render '{}': {}",
                template,
                describe_tera_error(&e)
            ))
            .into()
        })
    }

    /// Render a template with standard variables automatically added
    ///
    /// # Arguments
    /// * `template` - Template name
    /// * `context` - Base context (standard variables will be added)
    /// * `standard_vars` - Standard template variables to inject
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();

        full_context.insert("site_name", &standard_vars.site_name);
        full_context.insert("request_path", &standard_vars.request_path);
        full_context.insert("year", &standard_vars.year);

        if let Some(ref user) = standard_vars.current_user {
            full_context.insert("current_user", user);
        }

        self.render(template, &full_context)
    }
}

/// Collect `.html` templates from a directory tree, named by relative path
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;

            templates.push((template_name, content));
        }
    }

    Ok(())
}

/// Tera reports the interesting part of an error in its source chain
fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Last-resort page used when no template can be rendered
pub fn simple_error_page(status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="UTF-8"><title>{status}</title></head>
<body>
    <h1>{status}</h1>
    <p>{message}</p>
</body>
</html>"#,
        status = status,
        message = message
    )
}

/// Variables every page receives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardTemplateVars {
    /// Site name from the configuration
    pub site_name: String,
    /// Current logged-in user (optional)
    pub current_user: Option<CurrentUser>,
    /// Current request path
    pub request_path: String,
    /// Current year (for copyright)
    pub year: i32,
}

/// Current user information for templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

impl StandardTemplateVars {
    /// Create new standard template variables
    pub fn new(site_name: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            current_user: None,
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
        }
    }

    /// Set the current user
    pub fn with_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }
}

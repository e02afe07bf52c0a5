//! Admin page templates, compiled into the binary
//!
//! Sources live in `templates/pages/`. Autoescaping is on for every `.html` template.

use std::sync::OnceLock;

use axum::response::Html;
use minijinja::{Environment, Value};
use thiserror::Error;

use crate::core::error::AppError;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../../../templates/pages/layout.html"),
    ),
    (
        "product_card.html",
        include_str!("../../../templates/pages/product_card.html"),
    ),
    (
        "dashboard.html",
        include_str!("../../../templates/pages/dashboard.html"),
    ),
    (
        "categories.html",
        include_str!("../../../templates/pages/categories.html"),
    ),
    (
        "subcategories.html",
        include_str!("../../../templates/pages/subcategories.html"),
    ),
    (
        "products.html",
        include_str!("../../../templates/pages/products.html"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Two-decimal price formatting
fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("money", money);

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a page template into an HTML response
pub fn render(template_name: &str, ctx: Value) -> Result<Html<String>, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map(Html)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        let env = get_environment();
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "template {} failed", name);
        }
    }

    #[test]
    fn test_missing_template() {
        let result = render("nope.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_money_filter() {
        assert_eq!(money(19999.0), "19999.00");
        assert_eq!(money(12.5), "12.50");
    }

    #[test]
    fn test_output_is_escaped() {
        let html = render(
            "categories.html",
            context! {
                active => "categories",
                categories => vec![context! {
                    id => "1",
                    name => "<script>",
                    createdAt => "2025-10-20T10:00:00Z",
                }],
            },
        )
        .unwrap();

        assert!(html.0.contains("&lt;script&gt;"));
        assert!(!html.0.contains("<td><script>"));
    }
}

//! Page rendering with minijinja.
//!
//! Templates are compiled into the binary and served through a loader, so
//! a missing or broken template surfaces as a [`RenderError`] at render
//! time rather than at startup.

use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::Environment;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template render failed: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "page render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_loader(embedded_template);
    env
});

fn embedded_template(name: &str) -> Result<Option<String>, minijinja::Error> {
    let source = match name {
        "base.html" => include_str!("../templates/base.html"),
        "home.html" => include_str!("../templates/home.html"),
        "login.html" => include_str!("../templates/login.html"),
        "register.html" => include_str!("../templates/register.html"),
        "user.html" => include_str!("../templates/user.html"),
        "points.html" => include_str!("../templates/points.html"),
        "my_points.html" => include_str!("../templates/my_points.html"),
        "error.html" => include_str!("../templates/error.html"),
        _ => return Ok(None),
    };
    Ok(Some(source.to_owned()))
}

/// Render the named template with `ctx`.
///
/// # Errors
///
/// Returns an error if the template is unknown or fails to evaluate.
pub fn render(name: &str, ctx: impl Serialize) -> Result<Html<String>, RenderError> {
    let template = TEMPLATES.get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn unknown_template_is_error() {
        assert!(render("nope.html", context! {}).is_err());
    }

    #[test]
    fn every_embedded_template_parses() {
        for name in [
            "base.html",
            "home.html",
            "login.html",
            "register.html",
            "user.html",
            "points.html",
            "my_points.html",
            "error.html",
        ] {
            assert!(TEMPLATES.get_template(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn html_output_is_escaped() {
        let Html(body) = render("error.html", context! { message => "<script>" }).unwrap();
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }
}

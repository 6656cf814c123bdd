//! User-facing message catalog.
//!
//! Workflows never hard-code notification text; they name a message key and
//! pass substitutions, and the catalog renders the template before handing
//! it to the editor collaborator.

use crate::error::Result;
use crate::session::Session;
use std::sync::Arc;

fn template(key: &str) -> Option<&'static str> {
    match key {
        "testing" => Some("Testing..."),
        "testing-var" => Some("Testing: {varName}"),
        "test-not-found" => Some("Test not found"),
        "no-result" => Some("Evaluation produced no result"),
        "malformed-var" => Some("Could not parse a qualified var name from the result"),
        _ => None,
    }
}

/// Render a catalog template, replacing each `{name}` placeholder with its
/// substitution. Unknown keys render as the key itself so a missing catalog
/// entry degrades visibly instead of panicking.
pub fn render(key: &str, substitutions: &[(&str, &str)]) -> String {
    let mut text = template(key).unwrap_or(key).to_string();
    for (name, value) in substitutions {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

/// Render and show as a status-line echo.
pub async fn echo(session: &Arc<Session>, key: &str, substitutions: &[(&str, &str)]) -> Result<()> {
    session.editor().echo(render(key, substitutions)).await
}

/// Render and show as an error notification.
pub async fn error(session: &Arc<Session>, key: &str, substitutions: &[(&str, &str)]) -> Result<()> {
    session.editor().error(render(key, substitutions)).await
}

/// Show pre-rendered text as an informational notification.
pub async fn info_str(session: &Arc<Session>, text: &str) -> Result<()> {
    session.editor().info(text.to_string()).await
}

/// Show pre-rendered text as an error notification.
pub async fn error_str(session: &Arc<Session>, text: &str) -> Result<()> {
    session.editor().error(text.to_string()).await
}

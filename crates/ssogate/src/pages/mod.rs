//! HTML pages.
//!
//! Templates are compiled into the binary. `{{key}}` is replaced with the
//! HTML-escaped value, `{{{key}}}` with the value as is. Unknown keys render
//! as empty strings.

use std::collections::HashMap;

use axum::response::Html;

use crate::auth::CurrentUser;
use crate::provider::ProviderRegistry;

mod embedded {
    pub const LANDING: &str = include_str!("embedded/landing.html");
    pub const USER: &str = include_str!("embedded/user.html");
}

/// Page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    User,
}

impl Page {
    pub fn template(&self) -> &'static str {
        match self {
            Page::Landing => embedded::LANDING,
            Page::User => embedded::USER,
        }
    }
}

/// Render a page with the given data.
pub fn render(page: Page, data: &HashMap<&str, String>) -> Html<String> {
    Html(substitute(page.template(), data))
}

/// Landing page with one login link per provider.
pub fn landing(registry: &ProviderRegistry) -> Html<String> {
    let providers = registry
        .iter()
        .map(|provider| {
            format!(
                "    <li><a href=\"/auth/login/{}\">Sign in with {}</a></li>",
                escape(&provider.id),
                escape(&provider.display_name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut data = HashMap::new();
    data.insert("title", "Sign in".to_string());
    data.insert("providers", providers);
    render(Page::Landing, &data)
}

/// Protected page for the signed-in user.
pub fn user(current: &CurrentUser) -> Html<String> {
    let mut data = HashMap::new();
    data.insert("title", "Your account".to_string());
    data.insert("display_name", current.display_name().to_string());
    data.insert("subject_id", current.id().to_string());
    data.insert("provider", current.provider().to_string());
    render(Page::User, &data)
}

fn substitute(template: &str, data: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];

        let (raw, open, close) = if after.starts_with("{{{") {
            (true, "{{{", "}}}")
        } else {
            (false, "{{", "}}")
        };

        let Some(end) = after[open.len()..].find(close) else {
            out.push_str(after);
            return out;
        };

        let key = after[open.len()..open.len() + end].trim();
        if let Some(value) = data.get(key) {
            if raw {
                out.push_str(value);
            } else {
                out.push_str(&escape(value));
            }
        }
        rest = &after[open.len() + end + close.len()..];
    }

    out.push_str(rest);
    out
}

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

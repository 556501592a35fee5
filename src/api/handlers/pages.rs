//! Session-gated HTML pages.
//!
//! Pages are static templates compiled into the binary. Placeholders use
//! `{{name}}` and every substituted value is HTML-escaped.

use crate::{api::AppState, session::extract_session_token};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, Redirect},
};
use std::sync::Arc;
use tracing::{debug, error};

pub(crate) const LOGIN_TEMPLATE: &str = include_str!("../../../templates/login.html");
pub(crate) const SIGNUP_TEMPLATE: &str = include_str!("../../../templates/signup.html");
const HOME_TEMPLATE: &str = include_str!("../../../templates/home.html");
const SUMMARY_TEMPLATE: &str = include_str!("../../../templates/summary.html");
const SOLUTION_TEMPLATE: &str = include_str!("../../../templates/solution.html");
const NOTES_TEMPLATE: &str = include_str!("../../../templates/notes.html");

/// Username of the logged-in user; anyone else is sent to `/login`.
#[derive(Debug, Clone)]
pub struct RequireSession(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(state) = parts.extensions.get::<Arc<AppState>>() else {
            error!("AppState extension missing, rejecting session");
            return Err(Redirect::to("/login"));
        };

        let username = extract_session_token(&parts.headers)
            .and_then(|token| state.sessions.get(&token));

        match username {
            Some(username) => Ok(Self(username)),
            None => {
                debug!("no valid session for {}", parts.uri.path());
                Err(Redirect::to("/login"))
            }
        }
    }
}

/// Escape text for HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Fill `{{key}}` placeholders with escaped values in one pass over `template`.
/// Unknown keys are left as written.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut page = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        page.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                page.push_str(&escape_html(value));
                rest = &after[end + 2..];
            }
            None => {
                page.push_str("{{");
                rest = after;
            }
        }
    }
    page.push_str(rest);
    page
}

pub async fn root() -> Redirect {
    Redirect::to("/home")
}

pub async fn home(RequireSession(username): RequireSession) -> Html<String> {
    Html(render(HOME_TEMPLATE, &[("username", &username)]))
}

pub async fn summary(RequireSession(username): RequireSession) -> Html<String> {
    Html(render(SUMMARY_TEMPLATE, &[("username", &username)]))
}

pub async fn solution(RequireSession(username): RequireSession) -> Html<String> {
    Html(render(SOLUTION_TEMPLATE, &[("username", &username)]))
}

pub async fn notes(RequireSession(username): RequireSession) -> Html<String> {
    Html(render(NOTES_TEMPLATE, &[("username", &username)]))
}

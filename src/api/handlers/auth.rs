//! Signup, login and logout forms.
//!
//! A successful signup or login starts a session and redirects to `/home`.
//! Failures re-render the form with the error message.

use super::pages::{render, LOGIN_TEMPLATE, SIGNUP_TEMPLATE};
use crate::{
    api::AppState,
    credentials::{self, CredentialError},
    session::{clear_session_cookie, extract_session_token, session_cookie},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const STORAGE_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Deserialize, Debug, Default)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn form_page(template: &str, status: StatusCode, username: &str, error: &str) -> Response {
    (
        status,
        Html(render(template, &[("username", username), ("error", error)])),
    )
        .into_response()
}

fn credential_failure(template: &str, username: &str, err: &CredentialError) -> Response {
    let status = match err {
        CredentialError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CredentialError::DuplicateUser => StatusCode::CONFLICT,
        CredentialError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        CredentialError::Io(_) | CredentialError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if err.is_storage() {
        error!("Credential store failure: {err}");
        return form_page(template, status, username, STORAGE_ERROR);
    }
    form_page(template, status, username, &err.to_string())
}

/// Start a session for `username` and send the browser home.
fn start_session(state: &AppState, template: &str, username: &str) -> Response {
    let cookie = state
        .sessions
        .create(username)
        .and_then(|token| {
            session_cookie(&token, state.secure_cookies).map_err(anyhow::Error::from)
        });

    match cookie {
        Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to("/home")).into_response(),
        Err(err) => {
            error!("Failed to start session: {err}");
            form_page(
                template,
                StatusCode::INTERNAL_SERVER_ERROR,
                username,
                STORAGE_ERROR,
            )
        }
    }
}

pub async fn signup_page() -> Html<String> {
    Html(render(SIGNUP_TEMPLATE, &[("username", ""), ("error", "")]))
}

pub async fn login_page() -> Html<String> {
    Html(render(LOGIN_TEMPLATE, &[("username", ""), ("error", "")]))
}

#[instrument(skip_all)]
pub async fn signup(
    state: Extension<Arc<AppState>>,
    form: Option<Form<SignupForm>>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();

    match credentials::signup(
        state.users.as_ref(),
        &form.username,
        &form.password,
        &form.confirm_password,
    ) {
        Ok(username) => {
            info!("New account: {username}");
            start_session(&state, SIGNUP_TEMPLATE, &username)
        }
        Err(err) => {
            warn!("Signup rejected: {err}");
            credential_failure(SIGNUP_TEMPLATE, form.username.trim(), &err)
        }
    }
}

#[instrument(skip_all)]
pub async fn login(state: Extension<Arc<AppState>>, form: Option<Form<LoginForm>>) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();

    match credentials::login(state.users.as_ref(), &form.username, &form.password) {
        Ok(username) => {
            info!("Login: {username}");
            start_session(&state, LOGIN_TEMPLATE, &username)
        }
        Err(err) => {
            warn!("Login rejected: {err}");
            credential_failure(LOGIN_TEMPLATE, form.username.trim(), &err)
        }
    }
}

pub async fn logout(state: Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        state.sessions.remove(&token);
    }

    match clear_session_cookie(state.secure_cookies) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to("/login")).into_response(),
        Err(err) => {
            error!("Failed to build logout cookie: {err}");
            Redirect::to("/login").into_response()
        }
    }
}

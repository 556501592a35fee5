use crate::{api::AppState, short_commit, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

const X_APP: HeaderName = HeaderName::from_static("x-app");

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    generator: String,
}

impl Health {
    fn current(generator_enabled: bool) -> Self {
        Self {
            commit: GIT_COMMIT_HASH.to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generator: if generator_enabled { "enabled" } else { "disabled" }.to_string(),
        }
    }

    /// `name:version:commit`
    fn app_id(&self) -> String {
        format!("{}:{}:{}", self.name, self.version, short_commit(&self.commit))
    }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up; `generator` reports whether AI generation is configured", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(method: Method, state: Extension<Arc<AppState>>) -> Response {
    let health = Health::current(state.generator.is_enabled());

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&health.app_id()) {
        Ok(value) => {
            headers.insert(X_APP, value);
        }
        Err(err) => error!("Invalid X-App header value: {err}"),
    }

    if method == Method::GET {
        (headers, Json(health)).into_response()
    } else {
        (headers, Body::empty()).into_response()
    }
}

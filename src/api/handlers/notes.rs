use super::{
    image_text, read_upload, respond,
    types::{NotesRequest, NotesResponse},
    ApiError, NO_NOTES_INPUT,
};
use crate::{api::AppState, extract::transcript_for_url};
use axum::{
    extract::{Extension, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Where the notes come from; an image wins over a URL.
#[derive(Debug)]
enum Source {
    Image(Vec<u8>),
    Url(String),
}

#[utoipa::path(
    post,
    path = "/generate-notes",
    request_body(
        content = NotesRequest,
        description = "JSON `{url}`, or a multipart form with an `image` file (or a `url` field)"
    ),
    responses(
        (status = 200, description = "Study notes", body = NotesResponse),
        (status = 400, description = "No input, unusable input, or too little text", body = NotesResponse),
        (status = 500, description = "OCR engine or AI service failure", body = NotesResponse)
    ),
    tag = "notes"
)]
// axum handler for image or YouTube URL -> notes
pub async fn generate_notes(state: Extension<Arc<AppState>>, request: Request) -> Response {
    respond(notes(&state, request).await)
}

#[instrument(skip_all)]
async fn notes(state: &AppState, request: Request) -> Result<NotesResponse, ApiError> {
    let text = match source(request).await? {
        Source::Image(bytes) => {
            debug!("generating notes from an image of {} bytes", bytes.len());
            image_text(state.images.as_ref(), &bytes).await?
        }
        Source::Url(url) => {
            debug!("generating notes from a video transcript");
            transcript_for_url(state.transcripts.as_ref(), &url).await?
        }
    };

    let notes = state
        .generator
        .produce_notes(&text)
        .await
        .map_err(|err| ApiError::from_generation(err, "notes"))?;

    Ok(NotesResponse::success(notes))
}

async fn source(request: Request) -> Result<Source, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let (image, url) = if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.map_err(|err| {
            warn!("Malformed multipart request: {err}");
            ApiError::InvalidInput(NO_NOTES_INPUT.to_string())
        })?;
        let form = read_upload(&mut multipart).await?;
        (form.image, form.url)
    } else {
        let url = Json::<NotesRequest>::from_request(request, &())
            .await
            .ok()
            .and_then(|Json(body)| body.url)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        (None, url)
    };

    match (image, url) {
        (Some(bytes), _) => Ok(Source::Image(bytes)),
        (None, Some(url)) => Ok(Source::Url(url)),
        (None, None) => Err(ApiError::InvalidInput(NO_NOTES_INPUT.to_string())),
    }
}

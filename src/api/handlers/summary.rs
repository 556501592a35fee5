use super::{
    image_text, read_upload, respond, types::SummaryResponse, ApiError, NO_IMAGE,
};
use crate::api::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    response::Response,
};
use std::sync::Arc;
use tracing::{instrument, warn};

#[utoipa::path(
    post,
    path = "/upload-image",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Form with an `image` file field"
    ),
    responses(
        (status = 200, description = "Summary of the text found in the image", body = SummaryResponse),
        (status = 400, description = "Missing or unreadable image, or no text found", body = SummaryResponse),
        (status = 500, description = "OCR engine or AI service failure", body = SummaryResponse)
    ),
    tag = "summary"
)]
// axum handler for image upload -> summary
pub async fn upload_image(
    state: Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    respond(summarize_upload(&state, multipart).await)
}

#[instrument(skip_all)]
async fn summarize_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SummaryResponse, ApiError> {
    let mut multipart = multipart.map_err(|err| {
        warn!("Upload is not a multipart form: {err}");
        ApiError::InvalidInput(NO_IMAGE.to_string())
    })?;

    let image = read_upload(&mut multipart)
        .await?
        .image
        .ok_or_else(|| ApiError::InvalidInput(NO_IMAGE.to_string()))?;

    let text = image_text(state.images.as_ref(), &image).await?;

    let summary = state
        .generator
        .summarize(&text)
        .await
        .map_err(|err| ApiError::from_generation(err, "summary"))?;

    Ok(SummaryResponse::success(summary))
}

//! API handlers and the shared response envelope.
//!
//! Every JSON endpoint answers with an envelope holding exactly one of a result
//! field or an `error` string. [`ApiError`] carries the message and the status
//! code; [`respond`] turns a handler outcome into the final response.

pub mod auth;
pub mod health;
pub mod notes;
pub mod pages;
pub mod solve;
pub mod summary;
pub mod types;
pub mod youtube;

use crate::{
    extract::{ImageError, ImageTextExtractor, TranscriptError},
    generate::GenerationError,
};
use axum::{
    extract::{multipart::Field, Multipart},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

pub(crate) const AI_SERVICE_ERROR: &str = "AI service error. Please try again later.";
pub(crate) const NO_TEXT_IN_IMAGE: &str =
    "No text could be extracted from the image. Please upload a clearer image.";
pub(crate) const NO_IMAGE: &str = "No image file provided.";
pub(crate) const NO_URL: &str = "No YouTube URL provided.";
pub(crate) const NO_NOTES_INPUT: &str = "No image or YouTube URL provided.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    InvalidInput(String),
    /// Bad image, unusable link, no captions.
    #[error("{0}")]
    ExtractionFailure(String),
    /// Nothing usable came out of extraction.
    #[error("{0}")]
    EmptyContent(String),
    /// An external engine or service failed.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// The model answered without content.
    #[error("{0}")]
    GenerationFailed(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ServiceUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidInput(_)
            | Self::ExtractionFailure(_)
            | Self::EmptyContent(_)
            | Self::GenerationFailed(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Map a generation failure; `what` names the artifact ("summary", "notes").
    #[must_use]
    pub fn from_generation(err: GenerationError, what: &str) -> Self {
        match err {
            GenerationError::InputTooShort { len, min } => {
                debug!("input too short for {what}: {len} < {min}");
                Self::EmptyContent(format!(
                    "Not enough text to generate {what}. Please provide more content."
                ))
            }
            GenerationError::ServiceUnavailable(err) => {
                error!("AI service error while generating {what}: {err}");
                Self::ServiceUnavailable(AI_SERVICE_ERROR.to_string())
            }
            GenerationError::GenerationFailed => {
                Self::GenerationFailed(format!("Failed to generate {what}. Please try again."))
            }
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidImage(ref source) => {
                warn!("Rejected upload: {source}");
                Self::ExtractionFailure(err.to_string())
            }
            ImageError::OcrFailure(ref detail) => {
                error!("OCR engine failure: {detail}");
                Self::ServiceUnavailable(err.to_string())
            }
        }
    }
}

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        Self::ExtractionFailure(err.to_string())
    }
}

/// Response body carrying exactly one of a result or an error.
pub trait Envelope: Serialize {
    fn failure(error: String) -> Self;
}

/// Serialize a handler outcome; errors become `{<result>: null, error: <message>}`.
pub fn respond<E: Envelope>(outcome: Result<E, ApiError>) -> Response {
    match outcome {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => {
            let status = err.status();
            debug!("request failed with {status}: {err}");
            (status, Json(E::failure(err.to_string()))).into_response()
        }
    }
}

/// Read the bytes of a non-empty file field.
async fn field_bytes(field: Field<'_>) -> Result<Option<Vec<u8>>, ApiError> {
    let bytes = field.bytes().await.map_err(|err| {
        warn!("Failed to read upload: {err}");
        ApiError::InvalidInput("Could not read the uploaded file.".to_string())
    })?;
    Ok(if bytes.is_empty() {
        None
    } else {
        Some(bytes.to_vec())
    })
}

/// Multipart fields this service understands; unknown fields are skipped.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) image: Option<Vec<u8>>,
    pub(crate) url: Option<String>,
}

/// Walk the multipart body collecting the `image` file and an optional `url`.
pub(crate) async fn read_upload(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    loop {
        let field = multipart.next_field().await.map_err(|err| {
            warn!("Malformed multipart body: {err}");
            ApiError::InvalidInput("Could not read the uploaded file.".to_string())
        })?;
        let Some(field) = field else {
            break;
        };
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("image") if form.image.is_none() => form.image = field_bytes(field).await?,
            Some("url") => {
                let text = field.text().await.map_err(|err| {
                    warn!("Failed to read url field: {err}");
                    ApiError::InvalidInput(NO_URL.to_string())
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    form.url = Some(text.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// OCR an upload; an image without readable text is `EmptyContent`.
pub(crate) async fn image_text(
    images: &dyn ImageTextExtractor,
    bytes: &[u8],
) -> Result<String, ApiError> {
    let text = images.extract_text(bytes).await?;
    if text.trim().is_empty() {
        return Err(ApiError::EmptyContent(NO_TEXT_IN_IMAGE.to_string()));
    }
    Ok(text)
}

/// Reject blank optional strings, returning the trimmed value.
pub(crate) fn required(value: Option<&str>, message: &str) -> Result<String, ApiError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ApiError::InvalidInput(message.to_string()))
}

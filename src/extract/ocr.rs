//! OCR over uploaded images.
//!
//! Bytes are decoded first so garbage uploads fail fast with `InvalidImage`; the
//! decoded picture is re-encoded as PNG and piped through the `tesseract` CLI.

use async_trait::async_trait;
use image::ImageFormat;
use std::{io::Cursor, process::Stdio};
use thiserror::Error;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid image file. Please upload a valid image.")]
    InvalidImage(#[source] image::ImageError),
    #[error("Failed to read text from the image.")]
    OcrFailure(String),
}

#[async_trait]
pub trait ImageTextExtractor: Send + Sync {
    /// Recognize the text in `bytes`, trimmed. An empty string is a valid result.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ImageError>;
}

/// Decode `bytes` as any supported image format and re-encode it as PNG.
///
/// # Errors
/// `InvalidImage` when the bytes are not a decodable image.
pub fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::InvalidImage)?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| ImageError::OcrFailure(format!("failed to re-encode image: {err}")))?;
    Ok(png.into_inner())
}

/// Runs the Tesseract command-line engine.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    command: String,
    language: String,
}

impl TesseractExtractor {
    #[must_use]
    pub fn new(command: String, language: String) -> Self {
        Self { command, language }
    }

    async fn run(&self, png: Vec<u8>) -> Result<String, ImageError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ImageError::OcrFailure(format!("failed to start {}: {err}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|err| ImageError::OcrFailure(format!("failed to pipe image: {err}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| ImageError::OcrFailure(format!("OCR process failed: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImageError::OcrFailure(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ImageTextExtractor for TesseractExtractor {
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ImageError> {
        let owned = bytes.to_vec();
        let png = tokio::task::spawn_blocking(move || normalize_to_png(&owned))
            .await
            .map_err(|err| ImageError::OcrFailure(format!("image decoding task failed: {err}")))??;

        match self.run(png).await {
            Ok(text) => {
                debug!("OCR extracted {} characters", text.len());
                Ok(text)
            }
            Err(err) => {
                error!("OCR failed: {err:?}");
                Err(err)
            }
        }
    }
}

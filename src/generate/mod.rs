//! Prompt templates over an external text model.
//!
//! [`GenerationAdapter`] owns the preconditions: inputs that are too short never
//! reach the model. Model errors become `ServiceUnavailable`; a successful call
//! that yields no text becomes `GenerationFailed`.

pub mod gemini;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Minimum trimmed length for text to summarize, take notes on or quiz on.
pub const MIN_TEXT_CHARS: usize = 30;
/// Minimum trimmed length for a question.
pub const MIN_QUESTION_CHARS: usize = 3;

const SUMMARIZE_TEMPLATE: &str =
    "Summarize this text clearly and concisely for a student. Keep the key ideas and facts.\n\nText:\n";
const SOLVE_TEMPLATE: &str =
    "Solve step-by-step. Explain each step briefly and state the final answer clearly.\n\nQuestion:\n";
const NOTES_TEMPLATE: &str = "Generate well-structured study notes from this text. Use headings for the main topics and bullet points for the details.\n\nText:\n";
const MCQ_TEMPLATE: &str = "Generate five multiple-choice questions from this text. Put each question with its options A-D and the correct answer on a single line.\n\nText:\n";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("text model is not configured")]
    NotConfigured,
    #[error("request to text model failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text model returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// A text-completion backend.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Complete `prompt`. `Ok(None)` means the call succeeded without any text.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, ModelError>;

    /// Whether the backend can serve requests at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("input is too short: {len} characters, need at least {min}")]
    InputTooShort { len: usize, min: usize },
    #[error("AI service error: {0}")]
    ServiceUnavailable(#[source] ModelError),
    #[error("AI service returned an empty result")]
    GenerationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Summarize,
    Solve,
    Notes,
    Mcq,
}

impl Task {
    const fn template(self) -> &'static str {
        match self {
            Self::Summarize => SUMMARIZE_TEMPLATE,
            Self::Solve => SOLVE_TEMPLATE,
            Self::Notes => NOTES_TEMPLATE,
            Self::Mcq => MCQ_TEMPLATE,
        }
    }

    const fn min_chars(self) -> usize {
        match self {
            Self::Solve => MIN_QUESTION_CHARS,
            Self::Summarize | Self::Notes | Self::Mcq => MIN_TEXT_CHARS,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Solve => "solve",
            Self::Notes => "notes",
            Self::Mcq => "mcq",
        }
    }
}

#[derive(Clone)]
pub struct GenerationAdapter {
    model: Arc<dyn TextModel>,
}

impl std::fmt::Debug for GenerationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationAdapter")
            .field("enabled", &self.model.is_enabled())
            .finish()
    }
}

impl GenerationAdapter {
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.model.is_enabled()
    }

    /// # Errors
    /// See [`GenerationError`].
    pub async fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        self.run(Task::Summarize, text).await
    }

    /// # Errors
    /// See [`GenerationError`].
    pub async fn solve(&self, question: &str) -> Result<String, GenerationError> {
        self.run(Task::Solve, question).await
    }

    /// # Errors
    /// See [`GenerationError`].
    pub async fn produce_notes(&self, text: &str) -> Result<String, GenerationError> {
        self.run(Task::Notes, text).await
    }

    /// Multiple-choice questions, one per line.
    ///
    /// # Errors
    /// See [`GenerationError`].
    pub async fn generate_mcq(&self, text: &str) -> Result<Vec<String>, GenerationError> {
        let raw = self.run(Task::Mcq, text).await?;
        let questions: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();
        if questions.is_empty() {
            return Err(GenerationError::GenerationFailed);
        }
        Ok(questions)
    }

    #[instrument(skip_all, fields(task = task.as_str(), input_len = tracing::field::Empty))]
    async fn run(&self, task: Task, input: &str) -> Result<String, GenerationError> {
        let input = input.trim();
        let len = input.chars().count();
        tracing::Span::current().record("input_len", len);

        if len < task.min_chars() {
            debug!("input below {} characters, model not called", task.min_chars());
            return Err(GenerationError::InputTooShort {
                len,
                min: task.min_chars(),
            });
        }

        let prompt = format!("{}{input}", task.template());
        match self.model.complete(&prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => {
                error!("text model returned no content");
                Err(GenerationError::GenerationFailed)
            }
            Err(err) => {
                error!("text model call failed: {err}");
                Err(GenerationError::ServiceUnavailable(err))
            }
        }
    }
}

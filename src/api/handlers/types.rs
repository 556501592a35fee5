//! Request/response types for the JSON endpoints.

use super::Envelope;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct SolveRequest {
    pub question: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct YoutubeRequest {
    pub url: Option<String>,
    /// Also generate study notes from the transcript.
    #[serde(default)]
    pub notes: bool,
    /// Also generate multiple-choice questions from the transcript.
    #[serde(default)]
    pub mcq: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct NotesRequest {
    pub url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl SummaryResponse {
    #[must_use]
    pub fn success(summary: String) -> Self {
        Self {
            summary: Some(summary),
            error: None,
        }
    }
}

impl Envelope for SummaryResponse {
    fn failure(error: String) -> Self {
        Self {
            summary: None,
            error: Some(error),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SolutionResponse {
    pub solution: Option<String>,
    pub error: Option<String>,
}

impl SolutionResponse {
    #[must_use]
    pub fn success(solution: String) -> Self {
        Self {
            solution: Some(solution),
            error: None,
        }
    }
}

impl Envelope for SolutionResponse {
    fn failure(error: String) -> Self {
        Self {
            solution: None,
            error: Some(error),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NotesResponse {
    pub result: Option<String>,
    pub error: Option<String>,
}

impl NotesResponse {
    #[must_use]
    pub fn success(result: String) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }
}

impl Envelope for NotesResponse {
    fn failure(error: String) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }
}

/// `notes` and `mcq` are only present when requested.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct YoutubeResponse {
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcq: Option<Vec<String>>,
    pub error: Option<String>,
}

impl Envelope for YoutubeResponse {
    fn failure(error: String) -> Self {
        Self {
            summary: None,
            notes: None,
            mcq: None,
            error: Some(error),
        }
    }
}

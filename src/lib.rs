//! # Studymate (study assistant backend)
//!
//! `studymate` turns study material into AI-generated study aids. A client sends
//! an image, a free-text question or a YouTube URL; the service extracts the raw
//! text (OCR or caption transcript) and asks a generative model for a summary,
//! a worked solution, study notes or multiple-choice questions.
//!
//! ## Request pipeline
//!
//! Every API request is a single pass: validate input, run one extractor, call
//! the generation adapter once, answer with a JSON envelope. The envelope always
//! carries exactly one of a result field or an `error` string.
//!
//! ## Accounts
//!
//! HTML pages sit behind a cookie session. Accounts live in a flat JSON file of
//! `username -> password` pairs. Passwords are stored in plain text and the JSON
//! endpoints are not session-guarded.

pub mod api;
pub mod cli;
pub mod credentials;
pub mod extract;
pub mod generate;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// First seven characters of a commit hash.
#[must_use]
pub fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

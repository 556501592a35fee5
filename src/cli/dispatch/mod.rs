//! Map parsed CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{gemini, ocr, ARG_PORT, ARG_SECURE_COOKIES, ARG_USERS_FILE};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an argument is missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let users_file = matches
        .get_one::<String>(ARG_USERS_FILE)
        .map(PathBuf::from)
        .context("missing required argument: --users-file")?;

    let secure_cookies = matches
        .get_one::<bool>(ARG_SECURE_COOKIES)
        .copied()
        .unwrap_or(false);

    let tesseract = matches
        .get_one::<String>(ocr::ARG_TESSERACT)
        .cloned()
        .context("missing required argument: --tesseract")?;
    let ocr_lang = matches
        .get_one::<String>(ocr::ARG_OCR_LANG)
        .cloned()
        .context("missing required argument: --ocr-lang")?;

    let max_upload_bytes = matches
        .get_one::<usize>(ocr::ARG_MAX_UPLOAD_BYTES)
        .copied()
        .unwrap_or(ocr::DEFAULT_MAX_UPLOAD_BYTES);
    if max_upload_bytes == 0 {
        return Err(anyhow!("--{} must be greater than 0", ocr::ARG_MAX_UPLOAD_BYTES));
    }

    let gemini_opts = gemini::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        users_file,
        secure_cookies,
        tesseract,
        ocr_lang,
        max_upload_bytes,
        gemini_api_key: gemini_opts.api_key,
        gemini_model: gemini_opts.model,
        gemini_url: gemini_opts.base_url,
    }))
}

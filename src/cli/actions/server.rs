use crate::{
    api::{self, AppState},
    credentials::{JsonFileStore, UserStore},
    extract::{youtube::DEFAULT_YOUTUBE_BASE_URL, TesseractExtractor, YouTubeTranscripts},
    generate::{GeminiClient, GenerationAdapter},
    session::MemorySessionStore,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub users_file: PathBuf,
    pub secure_cookies: bool,
    pub tesseract: String,
    pub ocr_lang: String,
    pub max_upload_bytes: usize,
    pub gemini_api_key: Option<SecretString>,
    pub gemini_model: String,
    pub gemini_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the users file is unusable, an HTTP client cannot be
/// built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let users = JsonFileStore::new(&args.users_file);
    users.load().with_context(|| {
        format!(
            "Failed to open users file: {}",
            args.users_file.display()
        )
    })?;

    let model = GeminiClient::new(args.gemini_url, args.gemini_model, args.gemini_api_key)
        .context("Failed to build Gemini client")?;

    let transcripts = YouTubeTranscripts::new(DEFAULT_YOUTUBE_BASE_URL.to_string())
        .context("Failed to build YouTube client")?;

    let state = Arc::new(AppState {
        users: Arc::new(users),
        sessions: Arc::new(MemorySessionStore::new()),
        generator: GenerationAdapter::new(Arc::new(model)),
        images: Arc::new(TesseractExtractor::new(args.tesseract, args.ocr_lang)),
        transcripts: Arc::new(transcripts),
        secure_cookies: args.secure_cookies,
    });

    api::new(args.port, state, args.max_upload_bytes).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("users_file", args.users_file.display().to_string()),
        ("secure_cookies", args.secure_cookies.to_string()),
        ("tesseract", format!("{} ({})", args.tesseract, args.ocr_lang)),
        ("max_upload_bytes", args.max_upload_bytes.to_string()),
        ("gemini_url", args.gemini_url.clone()),
        ("gemini_model", args.gemini_model.clone()),
        ("gemini_api_key_set", args.gemini_api_key.is_some().to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        crate::short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

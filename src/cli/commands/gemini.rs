use crate::generate::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_GEMINI_API_KEY: &str = "gemini-api-key";
pub const ARG_GEMINI_MODEL: &str = "gemini-model";
pub const ARG_GEMINI_URL: &str = "gemini-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GEMINI_API_KEY)
                .long(ARG_GEMINI_API_KEY)
                .help("Google Gemini API key; AI generation is disabled without it")
                .env("GEMINI_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_GEMINI_MODEL)
                .long(ARG_GEMINI_MODEL)
                .help("Gemini model used for every prompt")
                .env("STUDYMATE_GEMINI_MODEL")
                .default_value(DEFAULT_GEMINI_MODEL),
        )
        .arg(
            Arg::new(ARG_GEMINI_URL)
                .long(ARG_GEMINI_URL)
                .help("Base URL of the Gemini API")
                .env("STUDYMATE_GEMINI_URL")
                .default_value(DEFAULT_GEMINI_BASE_URL),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the model is blank.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_key = matches
            .get_one::<String>(ARG_GEMINI_API_KEY)
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::from(key.to_string()));

        let model = matches
            .get_one::<String>(ARG_GEMINI_MODEL)
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .ok_or_else(|| anyhow!("--{ARG_GEMINI_MODEL} must not be empty"))?;

        let base_url = matches
            .get_one::<String>(ARG_GEMINI_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("Invalid --{ARG_GEMINI_URL}: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("--{ARG_GEMINI_URL} must use http or https: {base_url}"));
        }

        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }
}

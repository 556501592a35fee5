use clap::{Arg, Command};

pub const ARG_TESSERACT: &str = "tesseract";
pub const ARG_OCR_LANG: &str = "ocr-lang";
pub const ARG_MAX_UPLOAD_BYTES: &str = "max-upload-bytes";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TESSERACT)
                .long(ARG_TESSERACT)
                .help("Tesseract executable used for OCR")
                .env("STUDYMATE_TESSERACT")
                .default_value("tesseract"),
        )
        .arg(
            Arg::new(ARG_OCR_LANG)
                .long(ARG_OCR_LANG)
                .help("Tesseract language code(s), e.g. eng or eng+deu")
                .env("STUDYMATE_OCR_LANG")
                .default_value("eng"),
        )
        .arg(
            Arg::new(ARG_MAX_UPLOAD_BYTES)
                .long(ARG_MAX_UPLOAD_BYTES)
                .help("Maximum request body size for uploads, in bytes")
                .env("STUDYMATE_MAX_UPLOAD_BYTES")
                .default_value("16777216")
                .value_parser(clap::value_parser!(usize)),
        )
}

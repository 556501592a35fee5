//! Text extractors: turn an uploaded image or a video link into plain text.

pub mod ocr;
pub mod youtube;

pub use self::ocr::{ImageError, ImageTextExtractor, TesseractExtractor};
pub use self::youtube::{
    extract_video_id, transcript_for_url, TranscriptError, TranscriptFetcher, YouTubeTranscripts,
};

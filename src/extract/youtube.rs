//! YouTube caption transcripts.
//!
//! The watch page embeds the caption track list as JSON (`"captionTracks":[...]`).
//! One track is picked (manual English, then any English, then the first) and its
//! timedtext XML is flattened into plain text.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[?&]v=|/)([0-9A-Za-z_-]{11})(?:[?&#/]|$)").expect("valid video id regex")
});
static TEXT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("valid text element regex"));
static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid markup tag regex"));
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(x[0-9A-Fa-f]+|[0-9]+);").expect("valid numeric entity regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error(
        "Could not retrieve transcript. Please check the URL and make sure the video has captions."
    )]
    InvalidUrl,
    #[error(
        "Could not retrieve transcript. Please check the URL and make sure the video has captions."
    )]
    NoTranscript,
}

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Caption fragments for `video_id`, in playback order.
    async fn fetch(&self, video_id: &str) -> Result<Vec<String>, TranscriptError>;
}

/// Pull the 11-character video id out of a `v=ID` query or a trailing path segment.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Resolve `url` to a video, fetch its captions and join them into one string.
///
/// # Errors
/// `InvalidUrl` when no video id is present, `NoTranscript` when captions are
/// missing or empty.
#[instrument(skip(fetcher))]
pub async fn transcript_for_url(
    fetcher: &dyn TranscriptFetcher,
    url: &str,
) -> Result<String, TranscriptError> {
    let video_id = extract_video_id(url).ok_or(TranscriptError::InvalidUrl)?;
    let fragments = fetcher.fetch(&video_id).await?;
    let text = join_fragments(&fragments);
    if text.is_empty() {
        return Err(TranscriptError::NoTranscript);
    }
    debug!("transcript for {video_id}: {} characters", text.len());
    Ok(text)
}

fn join_fragments(fragments: &[String]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

/// Fetches captions straight from youtube.com.
#[derive(Debug, Clone)]
pub struct YouTubeTranscripts {
    client: Client,
    base_url: String,
}

impl YouTubeTranscripts {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: String) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeTranscripts {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<String>, TranscriptError> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        let html = self.get_text(&watch_url).await.map_err(|err| {
            warn!("Failed to load watch page: {err}");
            TranscriptError::NoTranscript
        })?;

        let tracks = caption_tracks(&html).ok_or_else(|| {
            warn!("No caption tracks for video {video_id}");
            TranscriptError::NoTranscript
        })?;
        let track = pick_track(&tracks).ok_or(TranscriptError::NoTranscript)?;

        let xml = self.get_text(&track.base_url).await.map_err(|err| {
            warn!("Failed to download captions: {err}");
            TranscriptError::NoTranscript
        })?;

        Ok(parse_timedtext(&xml))
    }
}

fn caption_tracks(html: &str) -> Option<Vec<CaptionTrack>> {
    let start = html.find(CAPTION_TRACKS_MARKER)? + CAPTION_TRACKS_MARKER.len();
    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()?
        .ok()
        .filter(|tracks| !tracks.is_empty())
}

fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let english = |track: &&CaptionTrack| track.language_code.starts_with("en");
    tracks
        .iter()
        .filter(english)
        .find(|track| track.kind.as_deref() != Some("asr"))
        .or_else(|| tracks.iter().find(english))
        .or_else(|| tracks.first())
}

fn parse_timedtext(xml: &str) -> Vec<String> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|raw| {
            let decoded = decode_entities(raw.as_str());
            let stripped = MARKUP_TAG.replace_all(&decoded, "");
            stripped.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Decode XML/HTML entities. Captions are often double-escaped (`&amp;#39;`),
/// so `&amp;` is resolved both first and last.
fn decode_entities(raw: &str) -> String {
    let once = raw.replace("&amp;", "&");
    let decoded = NUMERIC_ENTITY.replace_all(&once, |caps: &regex::Captures<'_>| {
        let code = &caps[1];
        let value = code
            .strip_prefix('x')
            .map_or_else(|| code.parse::<u32>().ok(), |hex| u32::from_str_radix(hex, 16).ok());
        value
            .and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });
    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(Result<Vec<String>, TranscriptError>);

    #[async_trait]
    impl TranscriptFetcher for StaticFetcher {
        async fn fetch(&self, _video_id: &str) -> Result<Vec<String>, TranscriptError> {
            match &self.0 {
                Ok(fragments) => Ok(fragments.clone()),
                Err(TranscriptError::InvalidUrl) => Err(TranscriptError::InvalidUrl),
                Err(TranscriptError::NoTranscript) => Err(TranscriptError::NoTranscript),
            }
        }
    }

    #[test]
    fn video_id_from_known_shapes() {
        let cases = [
            ("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtube.com/shorts/aB3_-xYz019?si=abc", "aB3_-xYz019"),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_video_id(url).as_deref(), Some(expected), "{url}");
        }
    }

    #[test]
    fn video_id_missing() {
        for url in [
            "not-a-url",
            "",
            "https://www.youtube.com/",
            "https://youtu.be/short",
            "https://example.com/watch?v=tooLongIdentifier123",
        ] {
            assert_eq!(extract_video_id(url), None, "{url}");
        }
    }

    #[tokio::test]
    async fn invalid_url_skips_fetch() {
        let fetcher = StaticFetcher(Ok(vec!["never".to_string()]));
        let result = transcript_for_url(&fetcher, "not-a-url").await;
        assert_eq!(result, Err(TranscriptError::InvalidUrl));
    }

    #[tokio::test]
    async fn fragments_joined_with_single_spaces() {
        let fetcher = StaticFetcher(Ok(vec![
            "  hello ".to_string(),
            String::new(),
            "world".to_string(),
        ]));
        let text = transcript_for_url(&fetcher, "https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(text.as_deref(), Ok("hello world"));
    }

    #[tokio::test]
    async fn blank_transcript_is_no_transcript() {
        let fetcher = StaticFetcher(Ok(vec!["   ".to_string()]));
        let result = transcript_for_url(&fetcher, "https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(result, Err(TranscriptError::NoTranscript));
    }

    #[test]
    fn parses_caption_tracks_from_watch_page() {
        let html = r#"<script>var x = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en"}],"audioTracks":[]}}};</script>"#;
        let tracks = caption_tracks(html).unwrap_or_default();
        assert_eq!(tracks.len(), 3);
        let picked = pick_track(&tracks).map(|track| track.base_url.as_str());
        assert_eq!(
            picked,
            Some("https://www.youtube.com/api/timedtext?v=abc&lang=en")
        );
    }

    #[test]
    fn no_caption_tracks() {
        assert!(caption_tracks("<html>nothing here</html>").is_none());
        assert!(caption_tracks(r#"{"captionTracks":[]}"#).is_none());
    }

    #[test]
    fn timedtext_fragments_are_decoded() {
        let xml = r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">It&amp;#39;s a
test</text><text start="1.5" dur="2">&lt;b&gt; &amp;amp; <font color="#fff">more</font></text><text start="3" dur="1"></text></transcript>"##;
        assert_eq!(
            parse_timedtext(xml),
            vec!["It's a test".to_string(), "& more".to_string()]
        );
    }

    #[test]
    fn entities_decode_across_many_fragments() {
        for _ in 0..3 {
            assert_eq!(
                decode_entities("caf&#xE9; &amp;#8217;s &#999999999;"),
                "café ’s &#999999999;"
            );
        }
        let xml = (0..200)
            .map(|i| format!(r#"<text start="{i}">line &amp;#{};</text>"#, 65 + i % 26))
            .collect::<String>();
        let fragments = parse_timedtext(&xml);
        assert_eq!(fragments.len(), 200);
        assert_eq!(fragments[0], "line A");
        assert_eq!(fragments[25], "line Z");
    }
}

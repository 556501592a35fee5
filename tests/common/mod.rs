//! Shared fakes and request helpers for the router tests.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, Request, StatusCode,
    },
    Router,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use studymate::{
    api::{self, AppState},
    credentials::{MemoryStore, UserStore},
    extract::{ImageError, ImageTextExtractor, TranscriptError, TranscriptFetcher},
    generate::{GenerationAdapter, ModelError, TextModel},
    session::{MemorySessionStore, SessionStore},
};
use tower::ServiceExt;

pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;
pub const BOUNDARY: &str = "studymate-test-boundary";

pub const LECTURE: &str =
    "The mitochondria is the powerhouse of the cell and produces most of its ATP.";

#[derive(Clone)]
pub enum Reply {
    Text(&'static str),
    Empty,
    Fail,
}

/// Text model answering every prompt the same way.
pub struct StubModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, ModelError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match self.reply {
            Reply::Text(text) => Ok(Some(text.to_string())),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(ModelError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
        }
    }
}

/// OCR engine returning fixed text, or failing like a crashed engine.
pub struct StubImages {
    text: Option<&'static str>,
    calls: AtomicUsize,
}

impl StubImages {
    pub fn reading(text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageTextExtractor for StubImages {
    async fn extract_text(&self, _bytes: &[u8]) -> Result<String, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .map(ToString::to_string)
            .ok_or_else(|| ImageError::OcrFailure("engine crashed".to_string()))
    }
}

/// Caption source keyed by nothing: every known video has the same captions.
pub struct StubTranscripts {
    fragments: Option<Vec<&'static str>>,
    requested: Mutex<Vec<String>>,
}

impl StubTranscripts {
    pub fn with(fragments: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            fragments: Some(fragments),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn without_captions() -> Arc<Self> {
        Arc::new(Self {
            fragments: None,
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptFetcher for StubTranscripts {
    async fn fetch(&self, video_id: &str) -> Result<Vec<String>, TranscriptError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(video_id.to_string());
        }
        self.fragments
            .as_ref()
            .map(|fragments| fragments.iter().map(ToString::to_string).collect())
            .ok_or(TranscriptError::NoTranscript)
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<StubModel>,
    pub images: Arc<StubImages>,
    pub transcripts: Arc<StubTranscripts>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    pub fn new(reply: Reply) -> Self {
        Self::with_parts(
            reply,
            StubImages::reading(LECTURE),
            StubTranscripts::with(vec![LECTURE]),
            Arc::new(MemoryStore::default()),
        )
    }

    pub fn with_parts(
        reply: Reply,
        images: Arc<StubImages>,
        transcripts: Arc<StubTranscripts>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let model = StubModel::new(reply);
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState {
            users,
            sessions: sessions.clone() as Arc<dyn SessionStore>,
            generator: GenerationAdapter::new(model.clone()),
            images: images.clone(),
            transcripts: transcripts.clone(),
            secure_cookies: false,
        };
        Self {
            router: api::app(Arc::new(state), MAX_UPLOAD_BYTES),
            model,
            images,
            transcripts,
            sessions,
        }
    }

    /// Same fakes, but OCR runs through the real decoder first.
    pub fn with_image_extractor(reply: Reply, images: Arc<dyn ImageTextExtractor>) -> Router {
        let state = AppState {
            users: Arc::new(MemoryStore::default()),
            sessions: Arc::new(MemorySessionStore::new()),
            generator: GenerationAdapter::new(StubModel::new(reply)),
            images,
            transcripts: StubTranscripts::without_captions(),
            secure_cookies: false,
        };
        api::app(Arc::new(state), MAX_UPLOAD_BYTES)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        send(&self.router, request).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?.to_vec();
    Ok(TestResponse {
        status,
        headers,
        body,
    })
}

pub fn json_request(uri: &str, body: &serde_json::Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

pub enum Part<'a> {
    File(&'a str, &'a [u8]),
    Text(&'a str, &'a str),
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Result<Request<Body>> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File(name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"page.png\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(CONTENT_LENGTH, body.len())
        .body(Body::from(body))?)
}

pub fn form_request(uri: &str, body: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))?)
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    Ok(builder.body(Body::empty())?)
}

/// `name=value` of the first `Set-Cookie` header.
pub fn session_pair(response: &TestResponse) -> Option<String> {
    response
        .header("set-cookie")
        .and_then(|cookie| cookie.split(';').next())
        .map(ToString::to_string)
}

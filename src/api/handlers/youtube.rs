use super::{
    required, respond,
    types::{YoutubeRequest, YoutubeResponse},
    ApiError, NO_URL,
};
use crate::{api::AppState, extract::transcript_for_url};
use axum::{extract::Extension, response::Response, Json};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path = "/youtube-process",
    request_body = YoutubeRequest,
    responses(
        (status = 200, description = "Transcript summary, plus notes and questions when requested", body = YoutubeResponse),
        (status = 400, description = "Missing URL, no transcript, or too little text", body = YoutubeResponse),
        (status = 500, description = "AI service failure", body = YoutubeResponse)
    ),
    tag = "youtube"
)]
// axum handler for YouTube URL -> summary (+ notes, mcq)
pub async fn youtube_process(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<YoutubeRequest>>,
) -> Response {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    respond(process(&state, request).await)
}

#[instrument(skip_all, fields(notes = request.notes, mcq = request.mcq))]
async fn process(state: &AppState, request: YoutubeRequest) -> Result<YoutubeResponse, ApiError> {
    let url = required(request.url.as_deref(), NO_URL)?;

    let transcript = transcript_for_url(state.transcripts.as_ref(), &url).await?;
    debug!("transcript has {} characters", transcript.len());

    let summary = state
        .generator
        .summarize(&transcript)
        .await
        .map_err(|err| ApiError::from_generation(err, "summary"))?;

    let notes = if request.notes {
        let notes = state
            .generator
            .produce_notes(&transcript)
            .await
            .map_err(|err| ApiError::from_generation(err, "notes"))?;
        Some(notes)
    } else {
        None
    };

    let mcq = if request.mcq {
        let questions = state
            .generator
            .generate_mcq(&transcript)
            .await
            .map_err(|err| ApiError::from_generation(err, "questions"))?;
        Some(questions)
    } else {
        None
    };

    Ok(YoutubeResponse {
        summary: Some(summary),
        notes,
        mcq,
        error: None,
    })
}

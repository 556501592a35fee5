use super::{
    required, respond,
    types::{SolutionResponse, SolveRequest},
    ApiError,
};
use crate::api::AppState;
use axum::{extract::Extension, response::Response, Json};
use std::sync::Arc;
use tracing::instrument;

const NO_QUESTION: &str = "No question provided.";

#[utoipa::path(
    post,
    path = "/solve-question",
    request_body = SolveRequest,
    responses(
        (status = 200, description = "Step-by-step solution", body = SolutionResponse),
        (status = 400, description = "Missing or too short question", body = SolutionResponse),
        (status = 500, description = "AI service failure", body = SolutionResponse)
    ),
    tag = "solve"
)]
// axum handler for question -> solution
pub async fn solve_question(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<SolveRequest>>,
) -> Response {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    respond(solve(&state, request).await)
}

#[instrument(skip_all)]
async fn solve(state: &AppState, request: SolveRequest) -> Result<SolutionResponse, ApiError> {
    let question = required(request.question.as_deref(), NO_QUESTION)?;

    let solution = state
        .generator
        .solve(&question)
        .await
        .map_err(|err| ApiError::from_generation(err, "solution"))?;

    Ok(SolutionResponse::success(solution))
}

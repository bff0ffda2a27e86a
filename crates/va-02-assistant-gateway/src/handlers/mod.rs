//! HTTP handlers.

use crate::domain::error::FeedError;
use crate::domain::intents::Intent;
use crate::domain::messages;
use crate::domain::skill::{SkillRequest, SkillResponse};
use crate::ports::outbound::BlogProvider;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<dyn BlogProvider>,
    pub post_count: usize,
}

/// Assistant endpoint: parse the skill request and answer its intent.
pub async fn handle_alexa(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match SkillRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unparseable skill request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let intent = Intent::resolve(&request);
    debug!(?intent, request_type = %request.request.request_type, "Routing skill request");
    Json(respond(&state, &intent).await).into_response()
}

/// Build the reply for an intent.
pub async fn respond(state: &AppState, intent: &Intent) -> SkillResponse {
    match intent {
        Intent::Welcome => SkillResponse::ask(messages::WELCOME),
        Intent::Feed => match state.blog.latest_posts().await {
            Ok(posts) => SkillResponse::tell(messages::latest_posts(&posts, state.post_count)),
            Err(e) => {
                log_feed_error(&e);
                SkillResponse::ask(messages::HELP)
            }
        },
        Intent::Exit => SkillResponse::tell(messages::EXIT),
        Intent::Help | Intent::Unknown(_) => SkillResponse::ask(messages::HELP),
    }
}

fn log_feed_error(error: &FeedError) {
    warn!(error = %error, "Blog feed unavailable; answering with help");
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::{ApiError, AppState};
use crate::speech::SpeechRequest;

pub async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".into()));
    }
    let max = state.speech_config.max_text_chars;
    if request.text.chars().count() > max {
        return Err(ApiError::BadRequest(format!("Text exceeds {} characters", max)));
    }

    match state.speech.synthesize(&request).await {
        Ok(audio) => {
            tracing::debug!(bytes = audio.len(), "Synthesized speech");
            Ok(([(header::CONTENT_TYPE, state.speech.content_type())], audio).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Speech synthesis failed, client will fall back");
            Err(ApiError::SpeechUnavailable(e.to_string()))
        }
    }
}

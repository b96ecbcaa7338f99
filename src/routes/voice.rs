use actix_web::{web, HttpResponse};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::MaybeUser;
use crate::routes::success;
use crate::services::voice_service::{self, available_commands, VoiceRequest};
use crate::state::AppState;

pub async fn process(
    user: MaybeUser,
    state: web::Data<AppState>,
    input: web::Json<VoiceRequest>,
) -> ApiResult<HttpResponse> {
    let request = input.into_inner();
    let has_input = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    if !has_input(&request.transcript) && !has_input(&request.audio_data) {
        return Err(ApiError::BadRequest(
            "Either transcript or audioData is required".to_string(),
        ));
    }

    let result = state.voice.process(request, &user.user_id_or_demo()).await;
    Ok(success("result", result, "Voice command processed successfully"))
}

pub async fn commands() -> HttpResponse {
    success(
        "commands",
        available_commands(),
        "Voice commands retrieved successfully",
    )
}

pub async fn status() -> HttpResponse {
    success("status", voice_service::status(), "Voice assistant is active")
}

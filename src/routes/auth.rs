use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiResult;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{LoginRequest, ProfileUpdate, RegisterRequest};
use crate::routes::success;
use crate::services::user_service::Session;
use crate::state::AppState;

fn session_response(session: Session, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": session.user,
        "token": session.token,
        "message": message,
    }))
}

pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let session = state.users.register(input.into_inner()).await?;
    Ok(session_response(session, "Registration successful"))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let session = state.users.login(input.into_inner()).await?;
    Ok(session_response(session, "Login successful"))
}

pub async fn profile(user: AuthenticatedUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let profile = state.users.profile(&user.user_id).await?;
    Ok(success("user", profile, "Profile retrieved successfully"))
}

pub async fn update_profile(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<ProfileUpdate>,
) -> ApiResult<HttpResponse> {
    let profile = state
        .users
        .update_profile(&user.user_id, input.into_inner())
        .await?;
    Ok(success("user", profile, "Profile updated successfully"))
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::analytics::RecommendationAction;
use crate::routes::{required, success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    pub recommendation_id: Option<String>,
    pub action: Option<String>,
}

/// Analytics are private to their owner.
fn own(user: &AuthenticatedUser, user_id: &str) -> ApiResult<()> {
    if user.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Analytics are only available for your own account".to_string(),
        ))
    }
}

pub async fn insights(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    own(&user, &path)?;
    let insights = state.analytics.user_insights(&path).await;
    Ok(success("insights", insights, "User insights generated successfully!"))
}

pub async fn dashboard(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    own(&user, &path)?;
    let dashboard = state.analytics.dashboard(&path).await;
    Ok(success(
        "dashboard",
        dashboard,
        "Analytics dashboard retrieved successfully!",
    ))
}

pub async fn track_recommendation(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<TrackInput>,
) -> ApiResult<HttpResponse> {
    let recommendation_id = required(
        input.recommendation_id.as_deref(),
        "recommendationId is required",
    )?;
    let action: RecommendationAction = required(input.action.as_deref(), "action is required")?
        .parse()
        .map_err(ApiError::BadRequest)?;

    let event = state
        .analytics
        .track_recommendation(&user.user_id, recommendation_id, action)
        .await?;
    Ok(success(
        "result",
        event,
        "Recommendation tracking recorded successfully!",
    ))
}

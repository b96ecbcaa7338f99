use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::middleware::auth_context::{AuthenticatedUser, MaybeUser};
use crate::models::itinerary::TripParams;
use crate::routes::success;
use crate::services::ai_service::{AdjustmentRequest, PreferenceRequest, RecommendationRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAdjustmentInput {
    #[serde(default)]
    pub itinerary: Value,
    #[serde(default)]
    pub weather: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialTemplateInput {
    #[serde(default)]
    pub itinerary: Value,
    pub platform: Option<String>,
}

pub async fn generate_itinerary(
    user: MaybeUser,
    state: web::Data<AppState>,
    input: web::Json<TripParams>,
) -> ApiResult<HttpResponse> {
    let itinerary = state
        .itineraries
        .generate_itinerary(&user.user_id_or_demo(), input.into_inner())
        .await?;
    Ok(success(
        "itinerary",
        itinerary,
        "AI-powered itinerary generated successfully!",
    ))
}

pub async fn recommendations(
    user: MaybeUser,
    state: web::Data<AppState>,
    input: web::Json<RecommendationRequest>,
) -> HttpResponse {
    let recommendations = state
        .itineraries
        .recommendations(&user.user_id_or_demo(), &input)
        .await;
    success(
        "recommendations",
        recommendations,
        "Personalized recommendations generated successfully!",
    )
}

pub async fn weather_adjustments(
    state: web::Data<AppState>,
    input: web::Json<WeatherAdjustmentInput>,
) -> HttpResponse {
    let adjustments = state
        .itineraries
        .weather_adjustments(&input.itinerary, &input.weather)
        .await;
    success(
        "adjustments",
        adjustments,
        "Weather-based adjustments generated successfully!",
    )
}

pub async fn social_templates(
    state: web::Data<AppState>,
    input: web::Json<SocialTemplateInput>,
) -> HttpResponse {
    let platform = input.platform.as_deref().unwrap_or("instagram");
    let templates = state
        .itineraries
        .social_templates(&input.itinerary, platform)
        .await;
    success("templates", templates, "Social templates generated successfully!")
}

pub async fn analyze_preferences(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<PreferenceRequest>,
) -> HttpResponse {
    let analysis = state
        .itineraries
        .analyze_preferences(&user.user_id, &input)
        .await;
    success("analysis", analysis, "Preferences analyzed successfully")
}

pub async fn adjust_itinerary(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<AdjustmentRequest>,
) -> ApiResult<HttpResponse> {
    let itinerary = state
        .itineraries
        .adjust_itinerary(&user.user_id, &input)
        .await?;
    Ok(success("itinerary", itinerary, "Itinerary adjusted successfully"))
}

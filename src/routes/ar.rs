use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::itinerary::Itinerary;
use crate::routes::{required, success};
use crate::services::ar_service::{accessibility_features, experience_categories, landmarks as known_landmarks};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LandmarkInput {
    pub landmark: Option<String>,
    pub destination: Option<String>,
}

impl LandmarkInput {
    fn pair(&self) -> ApiResult<(&str, &str)> {
        let message = "Landmark and destination are required";
        Ok((
            required(self.landmark.as_deref(), message)?,
            required(self.destination.as_deref(), message)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencesInput {
    pub itinerary: Option<Itinerary>,
    #[serde(default)]
    pub user_interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GamesInput {
    pub itinerary: Option<Itinerary>,
}

#[derive(Debug, Deserialize)]
pub struct NavigationInput {
    pub origin: Option<String>,
    pub destination: Option<String>,
    #[serde(default)]
    pub landmarks: Vec<String>,
}

fn itinerary_required(itinerary: Option<&Itinerary>) -> ApiResult<&Itinerary> {
    itinerary.ok_or_else(|| ApiError::BadRequest("Itinerary is required".to_string()))
}

pub async fn content(state: web::Data<AppState>, input: web::Json<LandmarkInput>) -> ApiResult<HttpResponse> {
    let (landmark, destination) = input.pair()?;
    let content = state.ar.content(landmark, destination).await;
    Ok(success("arContent", content, "AR content generated successfully!"))
}

pub async fn experiences(
    state: web::Data<AppState>,
    input: web::Json<ExperiencesInput>,
) -> ApiResult<HttpResponse> {
    let itinerary = itinerary_required(input.itinerary.as_ref())?;
    let experiences = state
        .ar
        .experiences(itinerary, &input.user_interests)
        .await;
    Ok(success(
        "arExperiences",
        experiences,
        "AR experiences recommended successfully!",
    ))
}

pub async fn photo_filters(
    state: web::Data<AppState>,
    input: web::Json<LandmarkInput>,
) -> ApiResult<HttpResponse> {
    let (landmark, destination) = input.pair()?;
    let filters = state.ar.photo_filters(landmark, destination).await;
    Ok(success("photoFilters", filters, "AR photo filters generated successfully!"))
}

pub async fn games(state: web::Data<AppState>, input: web::Json<GamesInput>) -> ApiResult<HttpResponse> {
    let itinerary = itinerary_required(input.itinerary.as_ref())?;
    let games = state.ar.games(itinerary).await;
    Ok(success("arGames", games, "AR games generated successfully!"))
}

pub async fn social(state: web::Data<AppState>, input: web::Json<LandmarkInput>) -> ApiResult<HttpResponse> {
    let (landmark, destination) = input.pair()?;
    let social = state.ar.social_content(landmark, destination).await;
    Ok(success("socialContent", social, "AR social content generated successfully!"))
}

pub async fn navigation(
    state: web::Data<AppState>,
    input: web::Json<NavigationInput>,
) -> ApiResult<HttpResponse> {
    let message = "Origin and destination are required";
    let origin = required(input.origin.as_deref(), message)?;
    let destination = required(input.destination.as_deref(), message)?;
    let navigation = state
        .ar
        .navigation(origin, destination, &input.landmarks)
        .await;
    Ok(success("navigation", navigation, "AR navigation generated successfully!"))
}

pub async fn landmarks(path: web::Path<String>) -> HttpResponse {
    success(
        "landmarks",
        known_landmarks(&path),
        "AR landmarks retrieved successfully!",
    )
}

pub async fn categories() -> HttpResponse {
    success(
        "categories",
        experience_categories(),
        "AR experience categories retrieved successfully!",
    )
}

pub async fn accessibility() -> HttpResponse {
    success(
        "features",
        accessibility_features(),
        "AR accessibility features retrieved successfully!",
    )
}

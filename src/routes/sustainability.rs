use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::MaybeUser;
use crate::models::itinerary::Itinerary;
use crate::routes::success;
use crate::services::sustainability_service::{local_impact as impact_of, track_progress};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItineraryInput {
    pub itinerary: Option<Itinerary>,
}

impl ItineraryInput {
    fn itinerary(&self) -> ApiResult<&Itinerary> {
        self.itinerary
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("Itinerary is required".to_string()))
    }
}

pub async fn carbon_footprint(
    state: web::Data<AppState>,
    input: web::Json<ItineraryInput>,
) -> ApiResult<HttpResponse> {
    let footprint = state.sustainability.carbon_footprint(input.itinerary()?).await;
    Ok(success(
        "carbonFootprint",
        footprint,
        "Carbon footprint calculated successfully!",
    ))
}

pub async fn local_impact(input: web::Json<ItineraryInput>) -> ApiResult<HttpResponse> {
    let impact = impact_of(input.itinerary()?);
    Ok(success("localImpact", impact, "Local impact calculated successfully!"))
}

pub async fn report(
    state: web::Data<AppState>,
    input: web::Json<ItineraryInput>,
) -> ApiResult<HttpResponse> {
    let report = state.sustainability.report(input.itinerary()?).await;
    Ok(success(
        "report",
        report,
        "Sustainability report generated successfully!",
    ))
}

pub async fn alternatives(
    state: web::Data<AppState>,
    input: web::Json<ItineraryInput>,
) -> ApiResult<HttpResponse> {
    let alternatives = state
        .sustainability
        .eco_alternatives(input.itinerary()?)
        .await;
    Ok(success(
        "alternatives",
        alternatives,
        "Eco-friendly alternatives generated successfully!",
    ))
}

pub async fn progress(user: MaybeUser, input: web::Json<ItineraryInput>) -> ApiResult<HttpResponse> {
    let progress = track_progress(&user.user_id_or_demo(), input.itinerary()?);
    Ok(success(
        "progress",
        progress,
        "Sustainability progress tracked successfully",
    ))
}

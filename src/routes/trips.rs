use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ApiResult;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Itinerary;
use crate::routes::success;
use crate::services::trip_service::popular_destinations as destinations;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInput {
    #[serde(default, alias = "sharedWith")]
    pub share_with: Value,
    pub permissions: Option<Vec<String>>,
}

pub async fn popular_destinations() -> HttpResponse {
    success(
        "destinations",
        destinations(),
        "Popular destinations retrieved successfully",
    )
}

pub async fn history(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let trips = state.trips.history(&user.user_id, query.limit).await?;
    Ok(success("trips", trips, "Trip history retrieved successfully"))
}

pub async fn get(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let itinerary = state.trips.get(&user.user_id, &path).await?;
    Ok(success("itinerary", itinerary, "Itinerary retrieved successfully"))
}

pub async fn save(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<Itinerary>,
) -> ApiResult<HttpResponse> {
    let id = state.trips.save(&user.user_id, input.into_inner()).await?;
    Ok(success("itineraryId", id, "Itinerary saved successfully"))
}

pub async fn update(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let itinerary = state
        .trips
        .update(&user.user_id, &path, input.into_inner())
        .await?;
    Ok(success("itinerary", itinerary, "Itinerary updated successfully"))
}

pub async fn delete(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.trips.delete(&user.user_id, &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Itinerary deleted successfully",
    })))
}

pub async fn share(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<ShareInput>,
) -> ApiResult<HttpResponse> {
    let ShareInput {
        share_with,
        permissions,
    } = input.into_inner();
    let share_id = state
        .trips
        .share(&user.user_id, &path, share_with, permissions)
        .await?;
    Ok(success("shareId", share_id, "Itinerary shared successfully"))
}

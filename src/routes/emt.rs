use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Itinerary;
use crate::routes::{required, success};
use crate::services::emt_service::{
    booking_statuses as status_table, service_categories, validate_booking, EmtBookingRequest,
    InventorySearch,
};
use crate::state::AppState;

const DEFAULT_PASSENGERS: u32 = 1;
const HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KindSearchInput {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Option<u32>,
    pub preferences: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityInput {
    pub item_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryBookingInput {
    pub itinerary: Option<Itinerary>,
    #[serde(default)]
    pub customer_info: Value,
    #[serde(default)]
    pub payment_info: Value,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuery {
    pub item_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CancelInput {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModifyInput {
    pub modifications: Value,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn search(
    state: web::Data<AppState>,
    input: web::Json<InventorySearch>,
) -> ApiResult<HttpResponse> {
    required(input.category.as_deref(), "Category is required")?;
    let results = state.emt.search_inventory(&input).await?;
    Ok(success("results", results, "Inventory search completed successfully"))
}

/// Preset searches: `transportation`, `accommodation` or `activities`.
pub async fn search_kind(
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<KindSearchInput>,
) -> ApiResult<HttpResponse> {
    let input = input.into_inner();
    let destination = required(input.destination.as_deref(), "Destination is required")?;
    let passengers = input.passengers.unwrap_or(DEFAULT_PASSENGERS);

    let results = match path.as_str() {
        "transportation" => {
            let origin = required(input.origin.as_deref(), "Origin is required")?;
            state
                .emt
                .search_transportation(
                    origin,
                    destination,
                    input.start_date.clone(),
                    passengers,
                    &input.preferences,
                )
                .await?
        }
        "accommodation" => {
            state
                .emt
                .search_accommodation(
                    destination,
                    input.start_date.clone(),
                    input.end_date.clone(),
                    passengers,
                    &input.preferences,
                )
                .await?
        }
        "activities" => {
            state
                .emt
                .search_activities(
                    destination,
                    input.start_date.clone(),
                    input.end_date.clone(),
                    passengers,
                    &input.preferences,
                )
                .await?
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown search type '{}'. Must be one of: transportation, accommodation, activities",
                other
            )))
        }
    };

    Ok(success("results", results, "Search completed successfully"))
}

pub async fn availability(
    state: web::Data<AppState>,
    input: web::Json<AvailabilityInput>,
) -> ApiResult<HttpResponse> {
    let (Some(item_id), Some(category), Some(start_date)) = (
        input.item_id.as_deref(),
        input.category.as_deref(),
        input.start_date.as_deref(),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: itemId, category, startDate".to_string(),
        ));
    };

    let availability = state
        .emt
        .check_availability(
            item_id,
            category,
            start_date,
            input.end_date.as_deref(),
            input.passengers.unwrap_or(DEFAULT_PASSENGERS),
        )
        .await?;
    Ok(success(
        "availability",
        availability,
        "Availability checked successfully",
    ))
}

pub async fn book(
    state: web::Data<AppState>,
    input: web::Json<EmtBookingRequest>,
) -> ApiResult<HttpResponse> {
    let validation = validate_booking(&input);
    if !validation.valid {
        return Err(ApiError::BadRequest(validation.errors.join("; ")));
    }

    let booking = state.emt.create_booking(&input).await?;
    Ok(success("booking", booking, "Booking created successfully"))
}

pub async fn book_itinerary(
    state: web::Data<AppState>,
    input: web::Json<ItineraryBookingInput>,
) -> ApiResult<HttpResponse> {
    let ItineraryBookingInput {
        itinerary,
        customer_info,
        payment_info,
    } = input.into_inner();
    let itinerary =
        itinerary.ok_or_else(|| ApiError::BadRequest("Itinerary is required".to_string()))?;
    if customer_info.is_null() || payment_info.is_null() {
        return Err(ApiError::BadRequest(
            "Customer info and payment info are required".to_string(),
        ));
    }

    let result = state
        .emt
        .book_complete_itinerary(&itinerary, customer_info, payment_info)
        .await;
    let message = if result.success {
        "Itinerary booked successfully"
    } else {
        "No itinerary items could be booked"
    };
    Ok(success("result", result, message))
}

pub async fn item(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CategoryQuery>,
) -> ApiResult<HttpResponse> {
    let details = state
        .emt
        .item_details(&path, query.category.as_deref())
        .await?;
    Ok(success("details", details, "Item details retrieved successfully"))
}

pub async fn pricing(
    state: web::Data<AppState>,
    query: web::Query<PricingQuery>,
) -> ApiResult<HttpResponse> {
    let (Some(item_id), Some(category)) = (query.item_id.as_deref(), query.category.as_deref())
    else {
        return Err(ApiError::BadRequest(
            "itemId and category are required".to_string(),
        ));
    };

    let pricing = state
        .emt
        .realtime_pricing(
            item_id,
            category,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.passengers.unwrap_or(DEFAULT_PASSENGERS),
        )
        .await?;
    Ok(success("pricing", pricing, "Pricing retrieved successfully"))
}

pub async fn categories() -> HttpResponse {
    success(
        "categories",
        service_categories(),
        "Service categories retrieved successfully",
    )
}

pub async fn booking_statuses() -> HttpResponse {
    success(
        "statuses",
        status_table(),
        "Booking statuses retrieved successfully",
    )
}

pub async fn booking(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let booking = state.emt.booking_status(&path).await?;
    Ok(success("booking", booking, "Booking status retrieved successfully"))
}

pub async fn confirmation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let confirmation = state.emt.booking_confirmation(&path).await?;
    Ok(success(
        "confirmation",
        confirmation,
        "Booking confirmation retrieved successfully",
    ))
}

pub async fn cancel(
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: Option<web::Json<CancelInput>>,
) -> ApiResult<HttpResponse> {
    let reason = input.and_then(|i| i.into_inner().reason);
    let result = state.emt.cancel_booking(&path, reason.as_deref()).await?;
    Ok(success("result", result, "Booking cancelled successfully"))
}

pub async fn modify(
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<ModifyInput>,
) -> ApiResult<HttpResponse> {
    let modifications = input.into_inner().modifications;
    if !modifications.is_object() {
        return Err(ApiError::BadRequest(
            "Modifications are required".to_string(),
        ));
    }
    let result = state.emt.modify_booking(&path, modifications).await?;
    Ok(success("result", result, "Booking modified successfully"))
}

pub async fn history(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let history = state
        .emt
        .booking_history(
            &user.user_id,
            query.limit.unwrap_or(HISTORY_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(success("history", history, "Booking history retrieved successfully"))
}

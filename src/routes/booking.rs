use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Amount;
use crate::models::payment::{ChargeRequest, PaymentDetails};
use crate::routes::payment::parse_method;
use crate::routes::success;
use crate::services::booking_service::BookItinerary;
use crate::state::AppState;

/// Payment fields sent with a booking: the charge itself plus the
/// method-specific details.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPayment {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub details: PaymentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookInput {
    pub itinerary_id: Option<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<BookingPayment>,
    pub contact_info: Value,
    pub special_requests: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInput {
    pub itinerary_id: Option<String>,
    pub traveler_details: Value,
    pub payment_details: Option<BookingPayment>,
    pub special_requests: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CancelInput {
    pub reason: Option<String>,
}

/// Charges the booking first and only books when the payment succeeded.
pub async fn book(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<BookInput>,
) -> ApiResult<HttpResponse> {
    let BookInput {
        itinerary_id,
        payment_method,
        payment_details,
        contact_info,
        special_requests,
    } = input.into_inner();

    let (Some(itinerary_id), Some(method), Some(payment)) =
        (itinerary_id, payment_method, payment_details)
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: itineraryId, paymentMethod, paymentDetails".to_string(),
        ));
    };

    let receipt = state
        .payments
        .process(ChargeRequest {
            user_id: user.user_id.clone(),
            amount: payment.amount.as_ref().map_or(0.0, Amount::as_cost),
            currency: payment.currency.unwrap_or_else(|| "USD".to_string()),
            method: parse_method(Some(&method))?,
            details: payment.details,
        })
        .await?;

    let booking = state
        .bookings
        .book_itinerary(
            &user.user_id,
            BookItinerary {
                itinerary_id,
                payment_id: Some(receipt.payment_id.clone()),
                contact_info,
                special_requests,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "booking": booking,
        "payment": receipt,
        "message": "Booking completed successfully",
    })))
}

/// Books against a payment taken earlier.
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<CreateInput>,
) -> ApiResult<HttpResponse> {
    let CreateInput {
        itinerary_id,
        traveler_details,
        payment_details,
        special_requests,
    } = input.into_inner();
    let itinerary_id = itinerary_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("itineraryId is required".to_string()))?;

    let booking = state
        .bookings
        .book_itinerary(
            &user.user_id,
            BookItinerary {
                itinerary_id,
                payment_id: payment_details.and_then(|p| p.details.payment_id),
                contact_info: traveler_details,
                special_requests,
            },
        )
        .await?;
    Ok(success("booking", booking, "Booking created successfully!"))
}

pub async fn my_bookings(user: AuthenticatedUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let bookings = state.bookings.user_bookings(&user.user_id).await?;
    Ok(success("bookings", bookings, "User bookings retrieved successfully"))
}

pub async fn status(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let booking = state.bookings.booking_status(&user.user_id, &path).await?;
    Ok(success("booking", booking, "Booking status retrieved successfully"))
}

pub async fn details(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let booking = state.bookings.booking_details(&user.user_id, &path).await?;
    Ok(success("booking", booking, "Booking retrieved successfully"))
}

pub async fn cancel(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: Option<web::Json<CancelInput>>,
) -> ApiResult<HttpResponse> {
    let reason = input.and_then(|i| i.into_inner().reason);
    let cancellation = state
        .bookings
        .cancel_booking(&user.user_id, &path, reason)
        .await?;
    Ok(success("cancellation", cancellation, "Booking cancelled successfully"))
}

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{error, info, warn};
use mongodb::{bson::doc, Collection, Database};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::db::mongo::BOOKINGS;
use crate::error::{ApiError, ApiResult};
use crate::models::booking::{
    Booking, Cancellation, CancellationResult, Refund, SegmentBooking, SegmentBookings,
    SegmentKind,
};
use crate::models::itinerary::{Amount, Itinerary};
use crate::services::notification_service::NotificationService;
use crate::services::trip_service::TripService;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("EMT_API_URL not configured")]
    NotConfigured,
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider rejected booking: {0}")]
    Rejected(String),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookItinerary {
    pub itinerary_id: String,
    pub payment_id: Option<String>,
    pub contact_info: Value,
    pub special_requests: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProviderConfirmation {
    success: bool,
    booking_id: Option<String>,
    cost: Option<Amount>,
    confirmation_code: Option<String>,
    ticket_url: Option<String>,
    message: Option<String>,
}

fn short_code(prefix: &str, booking_id: &str) -> String {
    let head: String = booking_id.chars().take(8).collect();
    format!("{}-{}", prefix, head.to_uppercase())
}

/// Accommodation stays are reserved locally; there is no provider call.
pub fn reserve_accommodations(itinerary: &Itinerary) -> Vec<SegmentBooking> {
    itinerary
        .booking_info
        .accommodations
        .iter()
        .map(|stay| {
            let booking_id = Uuid::new_v4().to_string();
            SegmentBooking {
                provider: Some(
                    stay.provider
                        .clone()
                        .unwrap_or_else(|| "Booking.com".to_string()),
                ),
                name: stay.name.clone(),
                check_in: stay.check_in.clone(),
                check_out: stay.check_out.clone(),
                party_size: stay.guests.max(1),
                cost: stay.price.clone(),
                confirmation_code: Some(short_code("ACC", &booking_id)),
                booking_url: Some(format!("https://booking.com/confirmation/{}", booking_id)),
                booking_id: Some(booking_id),
                ..SegmentBooking::new(SegmentKind::Accommodation, "confirmed")
            }
        })
        .collect()
}

/// Only activities flagged `bookingRequired` in the day plans are reserved.
pub fn reserve_activities(itinerary: &Itinerary) -> Vec<SegmentBooking> {
    itinerary
        .plan
        .days
        .iter()
        .flat_map(|day| {
            day.activities
                .iter()
                .filter(|a| a.booking_required)
                .map(move |activity| (day, activity))
        })
        .map(|(day, activity)| {
            let booking_id = Uuid::new_v4().to_string();
            SegmentBooking {
                provider: Some(
                    activity
                        .provider
                        .clone()
                        .unwrap_or_else(|| "Viator".to_string()),
                ),
                name: Some(activity.activity.clone()),
                date: day.date.clone(),
                time: activity.time.clone(),
                party_size: activity.participants.max(1),
                cost: activity.cost.clone(),
                confirmation_code: Some(short_code("ACT", &booking_id)),
                booking_url: Some(format!("https://viator.com/confirmation/{}", booking_id)),
                booking_id: Some(booking_id),
                ..SegmentBooking::new(SegmentKind::Activity, "confirmed")
            }
        })
        .collect()
}

/// A confirmed booking record for the reserved segments.
pub fn assemble_booking(
    user_id: &str,
    request: BookItinerary,
    bookings: SegmentBookings,
    now: DateTime<Utc>,
) -> Booking {
    Booking {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        itinerary_id: request.itinerary_id,
        payment_id: request.payment_id,
        status: "confirmed".to_string(),
        contact_info: request.contact_info,
        special_requests: request.special_requests,
        total_cost: bookings.total_cost(),
        bookings,
        cancellation_reason: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Transport segments still held with the provider.
pub fn cancellable_segments(booking: &Booking) -> impl Iterator<Item = &SegmentBooking> {
    booking
        .bookings
        .transportation
        .iter()
        .filter(|s| s.status == "confirmed")
}

fn pending_refund(reason: String) -> Refund {
    Refund {
        refund_id: Uuid::new_v4().to_string(),
        amount: 0.0,
        status: "pending".to_string(),
        reason,
    }
}

pub fn ensure_booking_owner(booking: &Booking, user_id: &str) -> ApiResult<()> {
    if booking.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Unauthorized access to booking".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct BookingService {
    bookings: Collection<Booking>,
    trips: TripService,
    notifications: NotificationService,
    http: Client,
    emt_api_url: Option<String>,
    emt_api_key: String,
}

impl BookingService {
    pub fn new(
        db: &Database,
        trips: TripService,
        notifications: NotificationService,
        emt_api_url: Option<String>,
        emt_api_key: String,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            bookings: db.collection(BOOKINGS),
            trips,
            notifications,
            http,
            emt_api_url: emt_api_url.map(|u| u.trim_end_matches('/').to_string()),
            emt_api_key,
        }
    }

    async fn emt_post(&self, path: &str, body: Value) -> Result<ProviderConfirmation, BookingError> {
        let base = self.emt_api_url.as_deref().ok_or(BookingError::NotConfigured)?;
        let response = self
            .http
            .post(format!("{}{}", base, path))
            .bearer_auth(&self.emt_api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Books every transport segment through EMT. A failing segment is kept
    /// as a `failed` entry so the rest of the trip still books.
    async fn book_transportation(&self, itinerary: &Itinerary, contact_info: &Value) -> Vec<SegmentBooking> {
        let mut booked = Vec::new();

        for segment in &itinerary.booking_info.transportation {
            let passengers = segment.passengers.max(1);
            let base = SegmentBooking {
                provider: Some("EMT".to_string()),
                route: segment.route.clone(),
                date: segment.date.clone(),
                time: segment.time.clone(),
                party_size: passengers,
                ..SegmentBooking::new(SegmentKind::Transportation, "confirmed")
            };

            let body = json!({
                "route": segment.route,
                "date": segment.date,
                "time": segment.time,
                "passengers": passengers,
                "contactInfo": contact_info,
                "preferences": segment.preferences.clone().unwrap_or_else(|| json!({})),
            });

            let result = self.emt_post("/book", body).await.and_then(|reply| {
                if reply.success {
                    Ok(reply)
                } else {
                    Err(BookingError::Rejected(
                        reply.message.unwrap_or_else(|| "unknown reason".to_string()),
                    ))
                }
            });

            match result {
                Ok(reply) => booked.push(SegmentBooking {
                    booking_id: reply.booking_id,
                    cost: reply.cost,
                    confirmation_code: reply.confirmation_code,
                    ticket_url: reply.ticket_url,
                    ..base
                }),
                Err(e) => {
                    error!(
                        "Error booking transportation for {}: {}",
                        segment.route.as_deref().unwrap_or("unknown route"),
                        e
                    );
                    booked.push(SegmentBooking {
                        status: "failed".to_string(),
                        error: Some(e.to_string()),
                        ..base
                    });
                }
            }
        }

        booked
    }

    pub async fn book_itinerary(&self, user_id: &str, request: BookItinerary) -> ApiResult<Booking> {
        let itinerary = self.trips.get(user_id, &request.itinerary_id).await?;

        let bookings = SegmentBookings {
            transportation: self.book_transportation(&itinerary, &request.contact_info).await,
            accommodations: reserve_accommodations(&itinerary),
            activities: reserve_activities(&itinerary),
        };

        let booking = assemble_booking(user_id, request, bookings, Utc::now());

        self.bookings.insert_one(&booking).await?;
        self.trips
            .mark_booked(&booking.itinerary_id, &booking.id)
            .await?;
        self.notifications.booking_confirmation(&booking);

        info!("Booked itinerary {} as {}", booking.itinerary_id, booking.id);
        Ok(booking)
    }

    /// Loads a booking the caller owns.
    pub async fn booking_details(&self, user_id: &str, booking_id: &str) -> ApiResult<Booking> {
        let booking = self
            .bookings
            .find_one(doc! { "_id": booking_id })
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
        ensure_booking_owner(&booking, user_id)?;
        Ok(booking)
    }

    /// Provider statuses are not polled; the stored record is authoritative.
    pub async fn booking_status(&self, user_id: &str, booking_id: &str) -> ApiResult<Booking> {
        self.booking_details(user_id, booking_id).await
    }

    pub async fn cancel_booking(
        &self,
        user_id: &str,
        booking_id: &str,
        reason: Option<String>,
    ) -> ApiResult<Cancellation> {
        let booking = self.booking_details(user_id, booking_id).await?;
        let reason = reason.unwrap_or_else(|| "User requested cancellation".to_string());

        let mut results = Vec::new();
        for segment in cancellable_segments(&booking) {
            let outcome = self
                .emt_post("/cancel", json!({ "bookingId": segment.booking_id }))
                .await;
            results.push(match outcome {
                Ok(_) => CancellationResult {
                    kind: SegmentKind::Transportation,
                    booking_id: segment.booking_id.clone(),
                    status: "cancelled".to_string(),
                    error: None,
                },
                Err(e) => {
                    warn!("Cancelling segment {:?} failed: {}", segment.booking_id, e);
                    CancellationResult {
                        kind: SegmentKind::Transportation,
                        booking_id: segment.booking_id.clone(),
                        status: "cancellation_failed".to_string(),
                        error: Some(e.to_string()),
                    }
                }
            });
        }

        let now = bson::to_bson(&Utc::now())?;
        self.bookings
            .update_one(
                doc! { "_id": booking_id },
                doc! { "$set": {
                    "status": "cancelled",
                    "cancellationReason": reason.as_str(),
                    "cancelledAt": now.clone(),
                    "updatedAt": now,
                }},
            )
            .await?;
        info!("Cancelled booking {} for user {}", booking_id, user_id);

        Ok(Cancellation {
            booking_id: booking_id.to_string(),
            status: "cancelled".to_string(),
            cancellation_results: results,
            refund: pending_refund(reason),
        })
    }

    /// Newest first.
    pub async fn user_bookings(&self, user_id: &str) -> ApiResult<Vec<Booking>> {
        let cursor = self
            .bookings
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itinerary() -> Itinerary {
        serde_json::from_value(json!({
            "bookingInfo": {
                "accommodations": [
                    { "name": "Taj Fort Aguada", "checkIn": "2024-12-20", "price": "₹12,000" },
                    { "name": "Zostel", "provider": "Hostelworld", "guests": 3, "price": 900 }
                ]
            },
            "itinerary": {
                "days": [
                    {
                        "day": 1,
                        "date": "2024-12-20",
                        "activities": [
                            { "activity": "Scuba dive", "bookingRequired": true, "cost": "₹3,500", "time": "09:00" },
                            { "activity": "Beach walk" }
                        ]
                    },
                    {
                        "day": 2,
                        "date": "2024-12-21",
                        "activities": [
                            { "activity": "Spice farm tour", "bookingRequired": true, "participants": 4, "provider": "GetYourGuide" }
                        ]
                    }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_short_code_uses_first_eight_chars() {
        assert_eq!(
            short_code("ACC", "3f2a9c1e-aaaa-bbbb-cccc-000000000000"),
            "ACC-3F2A9C1E"
        );
    }

    #[test]
    fn test_accommodations_default_provider() {
        let stays = reserve_accommodations(&itinerary());
        assert_eq!(stays.len(), 2);

        assert_eq!(stays[0].provider.as_deref(), Some("Booking.com"));
        assert_eq!(stays[0].party_size, 1);
        assert_eq!(stays[1].provider.as_deref(), Some("Hostelworld"));
        assert_eq!(stays[1].party_size, 3);

        let id = stays[0].booking_id.as_deref().unwrap();
        assert_eq!(
            stays[0].booking_url.as_deref(),
            Some(format!("https://booking.com/confirmation/{}", id).as_str())
        );
        assert!(stays[0].confirmation_code.as_deref().unwrap().starts_with("ACC-"));
    }

    #[test]
    fn test_only_required_activities_are_reserved() {
        let activities = reserve_activities(&itinerary());
        assert_eq!(activities.len(), 2);

        assert_eq!(activities[0].name.as_deref(), Some("Scuba dive"));
        assert_eq!(activities[0].date.as_deref(), Some("2024-12-20"));
        assert_eq!(activities[0].provider.as_deref(), Some("Viator"));
        assert_eq!(activities[1].party_size, 4);
        assert_eq!(activities[1].provider.as_deref(), Some("GetYourGuide"));
        assert!(activities
            .iter()
            .all(|a| a.confirmation_code.as_deref().unwrap().starts_with("ACT-")));
    }

    #[test]
    fn test_reserved_costs_total() {
        let itinerary = itinerary();
        let bookings = SegmentBookings {
            transportation: vec![],
            accommodations: reserve_accommodations(&itinerary),
            activities: reserve_activities(&itinerary),
        };
        assert_eq!(bookings.total_cost(), 16400.0);
    }

    fn request() -> BookItinerary {
        BookItinerary {
            itinerary_id: "trip-1".to_string(),
            payment_id: Some("pay-1".to_string()),
            contact_info: json!({ "email": "owner@example.com" }),
            special_requests: vec!["window seat".to_string()],
        }
    }

    fn transport(status: &str, booking_id: &str) -> SegmentBooking {
        SegmentBooking {
            booking_id: Some(booking_id.to_string()),
            ..SegmentBooking::new(SegmentKind::Transportation, status)
        }
    }

    #[test]
    fn test_assemble_booking_is_confirmed_for_owner() {
        let itinerary = itinerary();
        let bookings = SegmentBookings {
            transportation: vec![],
            accommodations: reserve_accommodations(&itinerary),
            activities: reserve_activities(&itinerary),
        };
        let now = Utc::now();
        let booking = assemble_booking("owner", request(), bookings, now);

        assert_eq!(booking.user_id, "owner");
        assert_eq!(booking.itinerary_id, "trip-1");
        assert_eq!(booking.status, "confirmed");
        assert_eq!(booking.payment_id.as_deref(), Some("pay-1"));
        assert_eq!(booking.total_cost, 16400.0);
        assert_eq!(booking.created_at, now);
        assert!(booking.cancelled_at.is_none());
        assert!(Uuid::parse_str(&booking.id).is_ok());
    }

    #[test]
    fn test_ensure_booking_owner() {
        let booking = assemble_booking("owner", request(), SegmentBookings::default(), Utc::now());

        assert!(ensure_booking_owner(&booking, "owner").is_ok());
        match ensure_booking_owner(&booking, "intruder") {
            Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "Unauthorized access to booking"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_only_confirmed_transport_is_cancelled() {
        let bookings = SegmentBookings {
            transportation: vec![
                transport("confirmed", "T-1"),
                transport("failed", "T-2"),
                transport("confirmed", "T-3"),
            ],
            accommodations: reserve_accommodations(&itinerary()),
            activities: vec![],
        };
        let booking = assemble_booking("owner", request(), bookings, Utc::now());

        let ids: Vec<_> = cancellable_segments(&booking)
            .filter_map(|s| s.booking_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["T-1", "T-3"]);
    }

    #[test]
    fn test_refund_starts_pending() {
        let refund = pending_refund("Change of plans".to_string());
        assert_eq!(refund.status, "pending");
        assert_eq!(refund.amount, 0.0);
        assert_eq!(refund.reason, "Change of plans");
    }
}

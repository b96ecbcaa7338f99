use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use log::{error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::ApiError;
use crate::models::itinerary::{Amount, Itinerary};

const TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CANCEL_REASON: &str = "User requested cancellation";

type Table = &'static [(&'static str, &'static str)];

pub const SERVICE_CATEGORIES: [(&str, Table); 4] = [
    (
        "transportation",
        &[
            ("flight", "Airline tickets and flights"),
            ("train", "Railway tickets and train services"),
            ("bus", "Bus tickets and intercity transport"),
            ("metro", "Local metro and public transport"),
            ("taxi", "Taxi and cab services"),
            ("car_rental", "Car rental services"),
        ],
    ),
    (
        "accommodation",
        &[
            ("hotel", "Hotels and resorts"),
            ("hostel", "Hostels and budget accommodations"),
            ("homestay", "Homestays and local accommodations"),
            ("apartment", "Apartment rentals"),
            ("villa", "Villa and luxury rentals"),
        ],
    ),
    (
        "activities",
        &[
            ("tours", "Guided tours and sightseeing"),
            ("adventures", "Adventure activities and sports"),
            ("cultural", "Cultural experiences and workshops"),
            ("food", "Food tours and culinary experiences"),
            ("entertainment", "Entertainment and shows"),
            ("wellness", "Wellness and spa services"),
        ],
    ),
    (
        "services",
        &[
            ("insurance", "Travel insurance"),
            ("visa", "Visa assistance"),
            ("guide", "Local guide services"),
            ("translation", "Translation services"),
            ("concierge", "Concierge services"),
        ],
    ),
];

pub const BOOKING_STATUSES: Table = &[
    ("pending", "Booking is being processed"),
    ("confirmed", "Booking confirmed"),
    ("cancelled", "Booking cancelled"),
    ("completed", "Service completed"),
    ("refunded", "Booking refunded"),
];

pub fn service_categories() -> Value {
    let table: Map<String, Value> = SERVICE_CATEGORIES
        .iter()
        .map(|(category, entries)| (category.to_string(), table_to_json(entries)))
        .collect();
    Value::Object(table)
}

pub fn booking_statuses() -> Value {
    table_to_json(BOOKING_STATUSES)
}

pub fn status_description(status: &str) -> Option<&'static str> {
    BOOKING_STATUSES
        .iter()
        .find(|(key, _)| *key == status)
        .map(|(_, description)| *description)
}

fn table_to_json(entries: Table) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect(),
    )
}

#[derive(Debug, Error)]
pub enum EmtError {
    #[error("EMT request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("EMT returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<EmtError> for ApiError {
    fn from(err: EmtError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySearch {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Option<u32>,
    pub budget: Option<Value>,
    pub preferences: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmtBookingRequest {
    pub item_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Option<u32>,
    pub customer_info: Option<Value>,
    pub payment_info: Option<Value>,
    pub special_requests: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn parses_as_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Checks required fields, then the start date, then the category.
/// Stops at the first failing rule.
pub fn validate_booking(request: &EmtBookingRequest) -> Validation {
    let missing: Vec<&str> = [
        ("itemId", request.item_id.as_deref().map_or(false, |s| !s.is_empty())),
        ("category", request.category.as_deref().map_or(false, |s| !s.is_empty())),
        ("startDate", request.start_date.as_deref().map_or(false, |s| !s.is_empty())),
        ("customerInfo", request.customer_info.as_ref().map_or(false, |v| !v.is_null())),
        ("paymentInfo", request.payment_info.as_ref().map_or(false, |v| !v.is_null())),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(field, _)| field)
    .collect();

    let invalid = |message: String| Validation {
        valid: false,
        errors: vec![message],
    };

    if !missing.is_empty() {
        return invalid(format!("Missing required fields: {}", missing.join(", ")));
    }

    if !request.start_date.as_deref().map_or(false, parses_as_date) {
        return invalid("Invalid start date format".to_string());
    }

    let category = request.category.as_deref().unwrap_or_default();
    if !SERVICE_CATEGORIES.iter().any(|(name, _)| *name == category) {
        let names: Vec<&str> = SERVICE_CATEGORIES.iter().map(|(name, _)| *name).collect();
        return invalid(format!(
            "Invalid category. Must be one of: {}",
            names.join(", ")
        ));
    }

    Validation {
        valid: true,
        errors: Vec::new(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub booking_id: Value,
    pub item: Value,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub item: Value,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub total_bookings: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub total_amount: f64,
    pub currency: &'static str,
}

pub fn booking_summary(bookings: &[BookedItem]) -> BookingSummary {
    let mut summary = BookingSummary {
        total_bookings: bookings.len(),
        currency: "INR",
        ..Default::default()
    };

    for booking in bookings {
        *summary.by_type.entry(booking.kind.to_string()).or_default() += 1;
        *summary.by_status.entry(booking.status.clone()).or_default() += 1;

        if let Some(price) = booking.item.get("price") {
            if let Ok(price) = serde_json::from_value::<Amount>(price.clone()) {
                summary.total_amount += price.as_cost();
            }
        }
    }

    summary
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryBookingResult {
    pub success: bool,
    pub bookings: Vec<BookedItem>,
    pub errors: Vec<FailedItem>,
    pub total_bookings: usize,
    pub total_errors: usize,
    pub summary: Value,
    pub booking_summary: BookingSummary,
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

fn count_field(item: &Value, key: &str) -> Option<u32> {
    item.get(key).and_then(Value::as_u64).map(|n| n as u32)
}

/// Client for the EMT inventory and booking API.
#[derive(Clone)]
pub struct EmtClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EmtClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = Client::builder().timeout(TIMEOUT).build().unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<Value, EmtError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmtError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn post(&self, path: &str, mut body: Value) -> Result<Value, EmtError> {
        if let Some(body) = body.as_object_mut() {
            body.insert("api_key".to_string(), json!(self.api_key));
        }

        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, EmtError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(query)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn search_inventory(&self, search: &InventorySearch) -> Result<Value, EmtError> {
        let body = json!({
            "category": search.category,
            "subcategory": search.subcategory,
            "destination": search.destination,
            "start_date": search.start_date,
            "end_date": search.end_date,
            "passengers": search.passengers.unwrap_or(1),
            "budget": search.budget,
            "preferences": search.preferences,
        });

        let data = self.post("/inventory/search", body).await.map_err(|e| {
            error!("Error searching EMT inventory: {}", e);
            e
        })?;

        Ok(json!({
            "success": true,
            "results": data.get("results").cloned().unwrap_or_else(|| json!([])),
            "totalResults": data.get("total_results").cloned().unwrap_or_else(|| json!(0)),
            "searchId": data.get("search_id"),
            "filters": data.get("available_filters").cloned().unwrap_or_else(|| json!({})),
        }))
    }

    pub async fn item_details(&self, item_id: &str, category: Option<&str>) -> Result<Value, EmtError> {
        let mut query = Vec::new();
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        let data = self.get(&format!("/inventory/item/{}", item_id), &query).await?;

        Ok(json!({
            "success": true,
            "item": data.get("item"),
            "availability": data.get("availability"),
            "pricing": data.get("pricing"),
            "policies": data.get("policies"),
        }))
    }

    pub async fn check_availability(
        &self,
        item_id: &str,
        category: &str,
        start_date: &str,
        end_date: Option<&str>,
        passengers: u32,
    ) -> Result<Value, EmtError> {
        let body = json!({
            "item_id": item_id,
            "category": category,
            "start_date": start_date,
            "end_date": end_date,
            "passengers": passengers,
        });
        let data = self.post("/inventory/availability", body).await?;

        Ok(json!({
            "success": true,
            "available": data.get("available"),
            "price": data.get("price"),
            "currency": data.get("currency"),
            "availability": data.get("availability_details"),
            "bookingDeadline": data.get("booking_deadline"),
        }))
    }

    pub async fn create_booking(&self, request: &EmtBookingRequest) -> Result<Value, EmtError> {
        let body = json!({
            "item_id": request.item_id,
            "category": request.category,
            "start_date": request.start_date,
            "end_date": request.end_date,
            "passengers": request.passengers,
            "customer_info": request.customer_info,
            "payment_info": request.payment_info,
            "special_requests": request.special_requests,
        });
        let data = self.post("/bookings/create", body).await.map_err(|e| {
            error!("Error creating EMT booking: {}", e);
            e
        })?;

        info!("EMT booking created: {}", data.get("booking_id").unwrap_or(&Value::Null));
        Ok(json!({
            "success": true,
            "bookingId": data.get("booking_id"),
            "status": data.get("status"),
            "confirmationNumber": data.get("confirmation_number"),
            "totalAmount": data.get("total_amount"),
            "currency": data.get("currency"),
            "bookingDetails": data.get("booking_details"),
            "cancellationPolicy": data.get("cancellation_policy"),
        }))
    }

    pub async fn booking_status(&self, booking_id: &str) -> Result<Value, EmtError> {
        let data = self.get(&format!("/bookings/{}", booking_id), &[]).await?;
        let status = data.get("status").and_then(Value::as_str).unwrap_or_default();

        Ok(json!({
            "success": true,
            "bookingId": data.get("booking_id"),
            "status": data.get("status"),
            "statusDescription": status_description(status),
            "bookingDetails": data.get("booking_details"),
            "totalAmount": data.get("total_amount"),
            "currency": data.get("currency"),
            "confirmationNumber": data.get("confirmation_number"),
            "cancellationPolicy": data.get("cancellation_policy"),
            "lastUpdated": data.get("last_updated"),
        }))
    }

    pub async fn cancel_booking(&self, booking_id: &str, reason: Option<&str>) -> Result<Value, EmtError> {
        let body = json!({ "reason": reason.unwrap_or(DEFAULT_CANCEL_REASON) });
        let data = self
            .post(&format!("/bookings/{}/cancel", booking_id), body)
            .await?;

        Ok(json!({
            "success": true,
            "bookingId": data.get("booking_id"),
            "status": data.get("status"),
            "refundAmount": data.get("refund_amount"),
            "refundCurrency": data.get("refund_currency"),
            "refundStatus": data.get("refund_status"),
            "cancellationFee": data.get("cancellation_fee"),
        }))
    }

    pub async fn modify_booking(&self, booking_id: &str, modifications: Value) -> Result<Value, EmtError> {
        let body = json!({ "modifications": modifications });
        let data = self
            .post(&format!("/bookings/{}/modify", booking_id), body)
            .await?;

        Ok(json!({
            "success": true,
            "bookingId": data.get("booking_id"),
            "status": data.get("status"),
            "modifications": data.get("applied_modifications"),
            "priceDifference": data.get("price_difference"),
            "newTotalAmount": data.get("new_total_amount"),
            "currency": data.get("currency"),
        }))
    }

    pub async fn booking_history(&self, user_id: &str, limit: u32, offset: u32) -> Result<Value, EmtError> {
        let query = [
            ("user_id", user_id.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let data = self.get("/bookings/history", &query).await?;

        Ok(json!({
            "success": true,
            "bookings": data.get("bookings").cloned().unwrap_or_else(|| json!([])),
            "totalBookings": data.get("total_bookings").cloned().unwrap_or_else(|| json!(0)),
            "hasMore": data.get("has_more").cloned().unwrap_or(Value::Bool(false)),
        }))
    }

    pub async fn realtime_pricing(
        &self,
        item_id: &str,
        category: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        passengers: u32,
    ) -> Result<Value, EmtError> {
        let mut query = vec![
            ("item_id", item_id.to_string()),
            ("category", category.to_string()),
            ("passengers", passengers.to_string()),
        ];
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }
        let data = self.get("/pricing/realtime", &query).await?;

        Ok(json!({
            "success": true,
            "price": data.get("price"),
            "currency": data.get("currency"),
            "originalPrice": data.get("original_price"),
            "discount": data.get("discount"),
            "taxes": data.get("taxes"),
            "fees": data.get("fees"),
            "totalPrice": data.get("total_price"),
            "priceValidUntil": data.get("price_valid_until"),
            "dynamicPricing": data.get("dynamic_pricing"),
        }))
    }

    pub async fn booking_confirmation(&self, booking_id: &str) -> Result<Value, EmtError> {
        let data = self
            .get(&format!("/bookings/{}/confirmation", booking_id), &[])
            .await?;

        Ok(json!({
            "success": true,
            "confirmation": {
                "bookingId": data.get("booking_id"),
                "confirmationNumber": data.get("confirmation_number"),
                "status": data.get("status"),
                "itemDetails": data.get("item_details"),
                "customerInfo": data.get("customer_info"),
                "bookingDates": data.get("booking_dates"),
                "totalAmount": data.get("total_amount"),
                "currency": data.get("currency"),
                "cancellationPolicy": data.get("cancellation_policy"),
                "contactInfo": data.get("contact_info"),
                "specialInstructions": data.get("special_instructions"),
            }
        }))
    }

    pub async fn search_transportation(
        &self,
        origin: &str,
        destination: &str,
        start_date: Option<String>,
        passengers: u32,
        preferences: &Map<String, Value>,
    ) -> Result<Value, EmtError> {
        let pref = |key: &str, default: Value| preferences.get(key).cloned().unwrap_or(default);
        let search = InventorySearch {
            category: Some("transportation".to_string()),
            subcategory: Some(pref_str(preferences, "mode", "flight")),
            destination: Some(format!("{} to {}", origin, destination)),
            end_date: start_date.clone(),
            start_date,
            passengers: Some(passengers),
            budget: preferences.get("budget").cloned(),
            preferences: json_map(json!({
                "class": pref("class", json!("economy")),
                "direct_flight": pref("directFlight", json!(false)),
                "flexible_dates": pref("flexibleDates", json!(false)),
            })),
        };
        self.search_inventory(&search).await
    }

    pub async fn search_accommodation(
        &self,
        destination: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        guests: u32,
        preferences: &Map<String, Value>,
    ) -> Result<Value, EmtError> {
        let pref = |key: &str, default: Value| preferences.get(key).cloned().unwrap_or(default);
        let search = InventorySearch {
            category: Some("accommodation".to_string()),
            subcategory: Some(pref_str(preferences, "type", "hotel")),
            destination: Some(destination.to_string()),
            start_date,
            end_date,
            passengers: Some(guests),
            budget: preferences.get("budget").cloned(),
            preferences: json_map(json!({
                "amenities": pref("amenities", json!([])),
                "rating": pref("rating", json!(3)),
                "location": pref("location", json!("city_center")),
                "breakfast_included": pref("breakfastIncluded", json!(false)),
            })),
        };
        self.search_inventory(&search).await
    }

    pub async fn search_activities(
        &self,
        destination: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        participants: u32,
        preferences: &Map<String, Value>,
    ) -> Result<Value, EmtError> {
        let pref = |key: &str, default: Value| preferences.get(key).cloned().unwrap_or(default);
        let search = InventorySearch {
            category: Some("activities".to_string()),
            subcategory: Some(pref_str(preferences, "type", "tours")),
            destination: Some(destination.to_string()),
            start_date,
            end_date,
            passengers: Some(participants),
            budget: preferences.get("budget").cloned(),
            preferences: json_map(json!({
                "duration": pref("duration", json!("half_day")),
                "difficulty": pref("difficulty", json!("easy")),
                "language": pref("language", json!("english")),
                "group_size": pref("groupSize", json!("small")),
            })),
        };
        self.search_inventory(&search).await
    }

    /// Books every transportation, accommodation and activity entry of the
    /// itinerary's booking info, in that order. Individual failures are
    /// collected, never propagated.
    pub async fn book_complete_itinerary(
        &self,
        itinerary: &Itinerary,
        customer_info: Value,
        payment_info: Value,
    ) -> ItineraryBookingResult {
        let info = &itinerary.booking_info;
        let mut items: Vec<(&'static str, &'static str, Value)> = Vec::new();
        for segment in &info.transportation {
            items.push(("transportation", "transportation", to_value(segment)));
        }
        for stay in &info.accommodations {
            items.push(("accommodation", "accommodation", to_value(stay)));
        }
        for activity in &info.activities {
            items.push(("activities", "activity", to_value(activity)));
        }

        let mut bookings = Vec::new();
        let mut errors = Vec::new();

        for (category, kind, item) in items {
            let request = EmtBookingRequest {
                item_id: str_field(&item, "emtItemId"),
                category: Some(category.to_string()),
                start_date: str_field(&item, "startDate")
                    .or_else(|| str_field(&item, "checkIn"))
                    .or_else(|| str_field(&item, "date")),
                end_date: str_field(&item, "endDate").or_else(|| str_field(&item, "checkOut")),
                passengers: count_field(&item, "passengers")
                    .or_else(|| count_field(&item, "guests"))
                    .or_else(|| count_field(&item, "participants")),
                customer_info: Some(customer_info.clone()),
                payment_info: Some(payment_info.clone()),
                special_requests: item
                    .get("specialRequests")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            };

            match self.create_booking(&request).await {
                Ok(booking) => bookings.push(BookedItem {
                    kind,
                    booking_id: booking["bookingId"].clone(),
                    status: booking["status"].as_str().unwrap_or("pending").to_string(),
                    item,
                }),
                Err(e) => errors.push(FailedItem {
                    kind,
                    item,
                    error: e.to_string(),
                }),
            }
        }

        let summary = booking_summary(&bookings);
        ItineraryBookingResult {
            success: !bookings.is_empty(),
            total_bookings: bookings.len(),
            total_errors: errors.len(),
            summary: json!({
                "successful": bookings.len(),
                "failed": errors.len(),
                "total": bookings.len() + errors.len(),
            }),
            booking_summary: summary,
            bookings,
            errors,
        }
    }
}

fn pref_str(preferences: &Map<String, Value>, key: &str, default: &str) -> String {
    preferences
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn json_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn to_value<T: Serialize>(item: &T) -> Value {
    serde_json::to_value(item).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EmtBookingRequest {
        EmtBookingRequest {
            item_id: Some("EMT-1".into()),
            category: Some("accommodation".into()),
            start_date: Some("2024-12-20".into()),
            customer_info: Some(json!({"name": "Asha"})),
            payment_info: Some(json!({"method": "card"})),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete_request() {
        assert_eq!(
            validate_booking(&request()),
            Validation {
                valid: true,
                errors: vec![]
            }
        );
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let result = validate_booking(&EmtBookingRequest {
            item_id: Some("EMT-1".into()),
            ..Default::default()
        });
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["Missing required fields: category, startDate, customerInfo, paymentInfo"]
        );
    }

    #[test]
    fn test_validate_rejects_bad_date_and_category() {
        let mut bad_date = request();
        bad_date.start_date = Some("next tuesday".into());
        assert_eq!(validate_booking(&bad_date).errors, vec!["Invalid start date format"]);

        let mut bad_category = request();
        bad_category.category = Some("cruises".into());
        assert_eq!(
            validate_booking(&bad_category).errors,
            vec!["Invalid category. Must be one of: transportation, accommodation, activities, services"]
        );
    }

    #[test]
    fn test_status_lookup() {
        assert_eq!(status_description("refunded"), Some("Booking refunded"));
        assert_eq!(status_description("lost"), None);
        assert_eq!(service_categories()["activities"]["food"], "Food tours and culinary experiences");
    }

    #[test]
    fn test_booking_summary_counts_and_totals() {
        let bookings = vec![
            BookedItem {
                kind: "transportation",
                booking_id: json!("B1"),
                item: json!({"price": 1200}),
                status: "confirmed".into(),
            },
            BookedItem {
                kind: "accommodation",
                booking_id: json!("B2"),
                item: json!({"price": "₹3,500"}),
                status: "pending".into(),
            },
            BookedItem {
                kind: "transportation",
                booking_id: json!("B3"),
                item: json!({}),
                status: "confirmed".into(),
            },
        ];
        let summary = booking_summary(&bookings);
        assert_eq!(summary.total_bookings, 3);
        assert_eq!(summary.by_type["transportation"], 2);
        assert_eq!(summary.by_status["confirmed"], 2);
        assert_eq!(summary.total_amount, 4700.0);
        assert_eq!(summary.currency, "INR");
    }

    #[actix_rt::test]
    async fn test_unreachable_inventory_collects_errors() {
        let client = EmtClient::new("http://127.0.0.1:9", "demo-key");
        let itinerary: Itinerary = serde_json::from_value(json!({
            "bookingInfo": {
                "transportation": [{ "route": "BOM-GOI", "emtItemId": "T1" }],
                "accommodations": [{ "name": "Sea View", "emtItemId": "H1" }]
            }
        }))
        .unwrap();

        let result = client
            .book_complete_itinerary(&itinerary, json!({}), json!({}))
            .await;
        assert!(!result.success);
        assert_eq!(result.total_errors, 2);
        assert_eq!(result.errors[0].kind, "transportation");
        assert_eq!(result.errors[1].kind, "accommodation");
        assert_eq!(result.summary["total"], 2);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::itinerary::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Transportation,
    Accommodation,
    Activity,
}

/// One provider reservation inside a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentBooking {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub provider: Option<String>,
    pub booking_id: Option<String>,
    pub name: Option<String>,
    pub route: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub party_size: u32,
    pub cost: Option<Amount>,
    pub status: String,
    pub confirmation_code: Option<String>,
    pub ticket_url: Option<String>,
    pub booking_url: Option<String>,
    pub error: Option<String>,
}

impl SegmentBooking {
    pub fn new(kind: SegmentKind, status: impl Into<String>) -> Self {
        Self {
            kind,
            provider: None,
            booking_id: None,
            name: None,
            route: None,
            date: None,
            time: None,
            check_in: None,
            check_out: None,
            party_size: 1,
            cost: None,
            status: status.into(),
            confirmation_code: None,
            ticket_url: None,
            booking_url: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentBookings {
    pub transportation: Vec<SegmentBooking>,
    pub accommodations: Vec<SegmentBooking>,
    pub activities: Vec<SegmentBooking>,
}

impl SegmentBookings {
    pub fn all(&self) -> impl Iterator<Item = &SegmentBooking> {
        self.transportation
            .iter()
            .chain(self.accommodations.iter())
            .chain(self.activities.iter())
    }

    pub fn total_cost(&self) -> f64 {
        self.all()
            .filter_map(|b| b.cost.as_ref())
            .map(Amount::as_cost)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub itinerary_id: String,
    pub payment_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub contact_info: Value,
    #[serde(default)]
    pub special_requests: Vec<String>,
    pub bookings: SegmentBookings,
    pub total_cost: f64,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResult {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub booking_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub refund_id: String,
    pub amount: f64,
    pub status: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub booking_id: String,
    pub status: String,
    pub cancellation_results: Vec<CancellationResult>,
    pub refund: Refund,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(kind: SegmentKind, cost: Option<Amount>) -> SegmentBooking {
        SegmentBooking {
            cost,
            ..SegmentBooking::new(kind, "confirmed")
        }
    }

    #[test]
    fn test_total_cost_sums_numeric_parts() {
        let bookings = SegmentBookings {
            transportation: vec![segment(
                SegmentKind::Transportation,
                Some(Amount::Text("₹2,500".into())),
            )],
            accommodations: vec![segment(
                SegmentKind::Accommodation,
                Some(Amount::Number(4000.0)),
            )],
            activities: vec![
                segment(SegmentKind::Activity, Some(Amount::Text("$12.50".into()))),
                segment(SegmentKind::Activity, None),
            ],
        };

        assert_eq!(bookings.total_cost(), 6512.5);
    }
}

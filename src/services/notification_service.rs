use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::booking::Booking;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
    pub booking_id: String,
    #[serde(default)]
    pub itinerary: Value,
    #[serde(default)]
    pub booking: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    pub phone: String,
    pub message: String,
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceipt {
    pub to: String,
    pub subject: String,
    pub booking_id: String,
    pub itinerary: Value,
    pub booking: Value,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceipt {
    pub to: String,
    pub message: String,
    pub booking_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Delivery is simulated: messages are logged and echoed back.
#[derive(Clone, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn send_confirmation_email(&self, request: EmailRequest) -> EmailReceipt {
        let receipt = EmailReceipt {
            subject: format!("Trip Booking Confirmed - {}", request.booking_id),
            to: request.email,
            booking_id: request.booking_id,
            itinerary: request.itinerary,
            booking: request.booking,
            sent_at: Utc::now(),
        };
        info!(
            "Confirmation email sent to {}: {}",
            receipt.to, receipt.subject
        );
        receipt
    }

    pub fn send_sms(&self, request: SmsRequest) -> SmsReceipt {
        let receipt = SmsReceipt {
            to: request.phone,
            message: request.message,
            booking_id: request.booking_id,
            sent_at: Utc::now(),
        };
        info!("SMS sent to {}: {}", receipt.to, receipt.message);
        receipt
    }

    pub fn booking_confirmation(&self, booking: &Booking) {
        info!(
            "Sending booking confirmation for {} (user {}, {} segments)",
            booking.id,
            booking.user_id,
            booking.bookings.all().count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_subject_names_booking() {
        let receipt = NotificationService.send_confirmation_email(EmailRequest {
            email: "asha@example.com".into(),
            booking_id: "BK-42".into(),
            itinerary: json!({"destination": "Goa"}),
            booking: Value::Null,
        });
        assert_eq!(receipt.subject, "Trip Booking Confirmed - BK-42");
        assert_eq!(receipt.to, "asha@example.com");
    }

    #[test]
    fn test_sms_echoes_payload() {
        let receipt = NotificationService.send_sms(SmsRequest {
            phone: "+919800000000".into(),
            message: "Your trip is booked".into(),
            booking_id: None,
        });
        let body = serde_json::to_value(&receipt).unwrap();
        assert_eq!(body["to"], "+919800000000");
        assert!(body["sentAt"].is_string());
    }
}

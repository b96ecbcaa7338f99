use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    PayPal,
    Razorpay,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stripe" => Ok(PaymentMethod::Stripe),
            "paypal" => Ok(PaymentMethod::PayPal),
            "razorpay" => Ok(PaymentMethod::Razorpay),
            other => Err(format!("Unsupported payment method: {}", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Razorpay => "razorpay",
        };
        write!(f, "{}", name)
    }
}

/// Method-specific fields sent by the client alongside a charge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    // stripe
    pub token: Option<String>,
    pub customer_id: Option<String>,
    // paypal
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    // razorpay
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub details: PaymentDetails,
}

/// Gateway outcome of a charge attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOutcome {
    pub payment_id: String,
    pub transaction_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub success: bool,
    pub payment_id: String,
    pub transaction_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_url: Option<String>,
    /// False when the charge went through but the payment could not be stored.
    pub recorded: bool,
}

impl PaymentReceipt {
    pub fn new(request: ChargeRequest, outcome: ChargeOutcome, recorded: bool) -> Self {
        Self {
            success: true,
            payment_id: outcome.payment_id,
            transaction_id: outcome.transaction_id,
            status: outcome.status,
            amount: request.amount,
            currency: request.currency,
            payment_method: request.method,
            client_secret: outcome.client_secret,
            approval_url: outcome.approval_url,
            recorded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: String,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeIntent {
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReceipt {
    pub refund_id: String,
    pub status: String,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub payment_id: String,
    pub status: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

/// Razorpay webhook envelope: `{ event, payload: { payment: { entity } } }`.
#[derive(Debug, Deserialize)]
pub struct RazorpayWebhook {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl RazorpayWebhook {
    pub fn payment_id(&self) -> Option<&str> {
        self.payload
            .pointer("/payment/entity/id")
            .and_then(Value::as_str)
    }
}

/// Converts a major-unit amount into the smallest currency unit.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parses_case_insensitively() {
        assert_eq!("Stripe".parse::<PaymentMethod>(), Ok(PaymentMethod::Stripe));
        assert_eq!(" PAYPAL ".parse::<PaymentMethod>(), Ok(PaymentMethod::PayPal));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_receipt_reports_unrecorded_charge() {
        let request = ChargeRequest {
            user_id: "user-1".to_string(),
            amount: 49.5,
            currency: "USD".to_string(),
            method: PaymentMethod::Stripe,
            details: PaymentDetails::default(),
        };
        let outcome = ChargeOutcome {
            payment_id: "pi_123".to_string(),
            transaction_id: "ch_123".to_string(),
            status: "succeeded".to_string(),
            client_secret: None,
            approval_url: None,
        };

        let receipt = serde_json::to_value(PaymentReceipt::new(request, outcome, false)).unwrap();
        assert_eq!(receipt["success"], true);
        assert_eq!(receipt["recorded"], false);
        assert_eq!(receipt["paymentId"], "pi_123");
        assert_eq!(receipt["paymentMethod"], "stripe");
        assert_eq!(receipt["amount"], 49.5);
        assert!(receipt.get("clientSecret").is_none());
    }

    #[test]
    fn test_to_minor_units_rounds() {
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(5.0), 500);
    }
}

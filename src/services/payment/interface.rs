use thiserror::Error;

use crate::error::ApiError;
use crate::models::payment::{ChargeOutcome, PaymentDetails, PaymentStatus, RefundReceipt};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Missing payment detail: {0}")]
    MissingDetail(&'static str),
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("{0}")]
    Declined(String),
    #[error("Webhook verification failed: {0}")]
    Webhook(String),
    #[error("Unsupported payment method: {0}")]
    Unsupported(String),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::MissingDetail(_)
            | PaymentError::Unsupported(_)
            | PaymentError::Webhook(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PaymentError::InvalidSignature | PaymentError::Declined(_) => {
                ApiError::PaymentFailed(err.to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Status change carried by a provider webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookUpdate {
    pub payment_id: String,
    pub status: &'static str,
}

/// One payment provider. Amounts are in major units; each gateway converts
/// to its own minor unit.
pub trait PaymentGateway {
    async fn charge(
        &self,
        amount: f64,
        currency: &str,
        details: &PaymentDetails,
    ) -> Result<ChargeOutcome, PaymentError>;

    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
        reason: &str,
    ) -> Result<RefundReceipt, PaymentError>;

    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, PaymentError>;
}

use std::str::FromStr;

use log::info;
use serde::Serialize;
use serde_json::json;
use stripe::{
    CreatePaymentIntent, CreateRefund, CustomerId, EventObject, EventType, Metadata, PaymentIntent,
    PaymentIntentConfirmationMethod, PaymentIntentId, PaymentIntentStatus, PaymentMethodId, Refund,
    Webhook,
};

use super::interface::{PaymentError, PaymentGateway, WebhookUpdate};
use crate::models::payment::{
    to_minor_units, ChargeOutcome, PaymentDetails, PaymentStatus, RefundReceipt,
    StripeIntent,
};

/// Lower-case wire name of a Stripe enum (`requires_action`, `usd`, ...).
fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn currency(code: &str) -> Result<stripe::Currency, PaymentError> {
    serde_json::from_value(json!(code.to_lowercase()))
        .map_err(|_| PaymentError::Gateway(format!("Unsupported currency: {}", code)))
}

fn source_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), "ai-trip-planner".to_string());
    metadata
}

fn intent_id(payment_id: &str) -> Result<PaymentIntentId, PaymentError> {
    PaymentIntentId::from_str(payment_id)
        .map_err(|_| PaymentError::Gateway(format!("Invalid payment intent id: {}", payment_id)))
}

pub struct StripeGateway {
    client: Option<stripe::Client>,
    webhook_secret: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<String>, webhook_secret: Option<String>) -> Self {
        Self {
            client: secret_key.map(stripe::Client::new),
            webhook_secret,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&stripe::Client, PaymentError> {
        self.client
            .as_ref()
            .ok_or(PaymentError::NotConfigured("STRIPE_SECRET_KEY"))
    }

    /// Unconfirmed intent for client-side confirmation.
    pub async fn create_intent(&self, amount: f64, currency_code: &str) -> Result<StripeIntent, PaymentError> {
        let mut params = CreatePaymentIntent::new(to_minor_units(amount), currency(currency_code)?);
        params.metadata = Some(source_metadata());

        let intent = PaymentIntent::create(self.client()?, params).await?;
        Ok(StripeIntent {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id.to_string(),
        })
    }

    /// Verifies the `Stripe-Signature` header and reports intent outcomes.
    /// Other event types are acknowledged with `None`.
    pub fn handle_webhook(&self, payload: &str, signature: &str) -> Result<Option<WebhookUpdate>, PaymentError> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(PaymentError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;

        let event = Webhook::construct_event(payload, signature, secret)
            .map_err(|e| PaymentError::Webhook(e.to_string()))?;

        let status = match event.type_ {
            EventType::PaymentIntentSucceeded => "completed",
            EventType::PaymentIntentPaymentFailed => "failed",
            other => {
                info!("Unhandled Stripe event type: {:?}", other);
                return Ok(None);
            }
        };

        match event.data.object {
            EventObject::PaymentIntent(intent) => Ok(Some(WebhookUpdate {
                payment_id: intent.id.to_string(),
                status,
            })),
            _ => Err(PaymentError::Webhook(
                "Invalid payment intent object".to_string(),
            )),
        }
    }
}

impl PaymentGateway for StripeGateway {
    async fn charge(
        &self,
        amount: f64,
        currency_code: &str,
        details: &PaymentDetails,
    ) -> Result<ChargeOutcome, PaymentError> {
        let client = self.client()?;

        let mut params = CreatePaymentIntent::new(to_minor_units(amount), currency(currency_code)?);
        params.confirm = Some(true);
        params.confirmation_method = Some(PaymentIntentConfirmationMethod::Manual);
        params.metadata = Some(source_metadata());

        let token = details
            .token
            .as_deref()
            .ok_or(PaymentError::MissingDetail("token"))?;
        params.payment_method =
            Some(PaymentMethodId::from_str(token).map_err(|_| PaymentError::MissingDetail("token"))?);
        if let Some(customer) = details.customer_id.as_deref() {
            params.customer = Some(
                CustomerId::from_str(customer).map_err(|_| PaymentError::MissingDetail("customerId"))?,
            );
        }

        let intent = PaymentIntent::create(client, params).await?;
        let id = intent.id.to_string();

        match intent.status {
            PaymentIntentStatus::Succeeded => Ok(ChargeOutcome {
                payment_id: id.clone(),
                transaction_id: id,
                status: "completed".to_string(),
                client_secret: None,
                approval_url: None,
            }),
            PaymentIntentStatus::RequiresAction => Ok(ChargeOutcome {
                payment_id: id.clone(),
                transaction_id: id,
                status: "requires_action".to_string(),
                client_secret: intent.client_secret,
                approval_url: None,
            }),
            other => Err(PaymentError::Declined(format!(
                "Payment failed with status: {}",
                wire_name(&other)
            ))),
        }
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
        reason: &str,
    ) -> Result<RefundReceipt, PaymentError> {
        let client = self.client()?;

        let mut params = CreateRefund::new();
        params.payment_intent = Some(intent_id(payment_id)?);
        params.amount = amount.map(to_minor_units);
        params.reason = serde_json::from_value(json!(reason)).ok();

        let refund = Refund::create(client, params).await?;
        let body = serde_json::to_value(&refund).unwrap_or_default();

        Ok(RefundReceipt {
            refund_id: refund.id.to_string(),
            status: body["status"].as_str().unwrap_or("pending").to_string(),
            amount: body["amount"].as_f64().map(|a| a / 100.0).or(amount),
        })
    }

    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, PaymentError> {
        let intent = PaymentIntent::retrieve(self.client()?, &intent_id(payment_id)?, &[]).await?;

        Ok(PaymentStatus {
            payment_id: intent.id.to_string(),
            status: wire_name(&intent.status),
            amount: Some(intent.amount as f64 / 100.0),
            currency: Some(wire_name(&intent.currency)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(wire_name(&PaymentIntentStatus::RequiresAction), "requires_action");
        assert_eq!(wire_name(&currency("USD").unwrap()), "usd");
    }

    #[actix_rt::test]
    async fn test_unconfigured_gateway() {
        let gateway = StripeGateway::new(None, None);
        assert!(!gateway.is_configured());
        assert!(matches!(
            gateway.status("pi_123").await,
            Err(PaymentError::NotConfigured("STRIPE_SECRET_KEY"))
        ));
        assert!(matches!(
            gateway.handle_webhook("{}", "t=1,v1=abc"),
            Err(PaymentError::NotConfigured("STRIPE_WEBHOOK_SECRET"))
        ));
    }
}

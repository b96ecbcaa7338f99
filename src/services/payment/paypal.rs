use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::interface::{PaymentError, PaymentGateway};
use crate::models::payment::{
    ChargeOutcome, PaymentDetails, PaymentStatus, RefundReceipt,
};

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    300
}

/// Refresh this long before PayPal's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPayment {
    id: String,
    #[serde(default)]
    links: Vec<Link>,
}

/// PayPal REST v1 sale payments. Refunds and status lookups are not wired to
/// PayPal and report success locally.
pub struct PayPalGateway {
    http: Client,
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalGateway {
    pub fn new(base_url: impl Into<String>, client_id: Option<String>, client_secret: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            http,
            base_url: base_url.into(),
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    async fn access_token(&self) -> Result<String, PaymentError> {
        let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) else {
            return Err(PaymentError::NotConfigured("PAYPAL_CLIENT_ID/PAYPAL_CLIENT_SECRET"));
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        debug!("Requesting PayPal access token");
        let token: AccessToken = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

impl PaymentGateway for PayPalGateway {
    async fn charge(
        &self,
        amount: f64,
        currency: &str,
        details: &PaymentDetails,
    ) -> Result<ChargeOutcome, PaymentError> {
        let token = self.access_token().await?;

        let body = json!({
            "intent": "sale",
            "payer": { "payment_method": "paypal" },
            "redirect_urls": {
                "return_url": details.return_url,
                "cancel_url": details.cancel_url,
            },
            "transactions": [{
                "amount": {
                    "total": format!("{:.2}", amount),
                    "currency": currency.to_uppercase(),
                },
                "description": "AI Trip Planner Booking",
            }],
        });

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway(format!(
                "PayPal payment creation failed ({}): {}",
                status, text
            )));
        }

        let payment: CreatedPayment = response.json().await?;
        let approval_url = payment
            .links
            .into_iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href)
            .ok_or_else(|| PaymentError::Gateway("PayPal returned no approval URL".to_string()))?;

        info!("PayPal payment {} awaiting approval", payment.id);
        Ok(ChargeOutcome {
            payment_id: payment.id.clone(),
            transaction_id: payment.id,
            status: "pending".to_string(),
            client_secret: None,
            approval_url: Some(approval_url),
        })
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
        reason: &str,
    ) -> Result<RefundReceipt, PaymentError> {
        let refund_id = format!("refund_{}", Uuid::new_v4());
        info!(
            "PayPal refund {} recorded for {} ({})",
            refund_id, payment_id, reason
        );
        Ok(RefundReceipt {
            refund_id,
            status: "completed".to_string(),
            amount,
        })
    }

    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, PaymentError> {
        Ok(PaymentStatus {
            payment_id: payment_id.to_string(),
            status: "completed".to_string(),
            amount: None,
            currency: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_charge_requires_credentials() {
        let gateway = PayPalGateway::new("https://api.sandbox.paypal.com", None, None);
        assert!(!gateway.is_configured());

        let result = gateway.charge(10.0, "usd", &PaymentDetails::default()).await;
        assert!(matches!(result, Err(PaymentError::NotConfigured(_))));
    }

    #[actix_rt::test]
    async fn test_refund_is_recorded_locally() {
        let gateway = PayPalGateway::new("https://api.sandbox.paypal.com", None, None);
        let receipt = gateway
            .refund("PAY-1", Some(25.0), "requested_by_customer")
            .await
            .unwrap();
        assert!(receipt.refund_id.starts_with("refund_"));
        assert_eq!(receipt.status, "completed");
        assert_eq!(receipt.amount, Some(25.0));
    }

    #[test]
    fn test_access_token_requires_credentials() {
        let gateway = PayPalGateway::new("https://api.sandbox.paypal.com", Some("id".into()), None);
        let result = tokio_test::block_on(gateway.access_token());
        assert!(matches!(result, Err(PaymentError::NotConfigured(_))));
    }

    #[test]
    fn test_token_expiry_defaults_when_missing() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token":"A21"}"#).unwrap();
        assert_eq!(token.expires_in, 300);
    }
}

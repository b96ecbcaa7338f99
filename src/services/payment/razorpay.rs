use std::time::Duration;

use hmac::{Hmac, Mac};
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use super::interface::{PaymentError, PaymentGateway, WebhookUpdate};
use crate::models::payment::{
    to_minor_units, ChargeOutcome, PaymentDetails, PaymentStatus, RazorpayOrder,
    RazorpayWebhook, RefundReceipt,
};

const API_BASE: &str = "https://api.razorpay.com/v1";

type HmacSha256 = Hmac<Sha256>;

/// Constant-time check of a hex signature over `message`.
pub fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// Checkout signature: HMAC of `"{order_id}|{payment_id}"`.
pub fn verify_payment_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    verify(secret, format!("{}|{}", order_id, payment_id).as_bytes(), signature)
}

#[derive(Debug, Deserialize)]
struct RazorpayPayment {
    id: String,
    status: String,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrderResponse {
    id: String,
    amount: i64,
    currency: String,
    receipt: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayRefund {
    id: String,
    status: String,
    #[serde(default)]
    amount: Option<i64>,
}

struct Credentials {
    key_id: String,
    key_secret: String,
}

pub struct RazorpayGateway {
    http: Client,
    credentials: Option<Credentials>,
    webhook_secret: Option<String>,
}

impl RazorpayGateway {
    pub fn new(key_id: Option<String>, key_secret: Option<String>, webhook_secret: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        let credentials = match (key_id, key_secret) {
            (Some(key_id), Some(key_secret)) => Some(Credentials { key_id, key_secret }),
            _ => None,
        };

        Self {
            http,
            credentials,
            webhook_secret,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&Credentials, PaymentError> {
        self.credentials
            .as_ref()
            .ok_or(PaymentError::NotConfigured("RAZORPAY_KEY_ID/RAZORPAY_KEY_SECRET"))
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PaymentError> {
        let credentials = self.credentials()?;
        let response = request
            .basic_auth(&credentials.key_id, Some(&credentials.key_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            let reason = body
                .pointer("/error/description")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            return Err(PaymentError::Gateway(format!("{}: {}", status, reason)));
        }
        Ok(response.json().await?)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, PaymentError> {
        self.send(self.http.get(format!("{}/payments/{}", API_BASE, payment_id)))
            .await
    }

    pub async fn create_order(&self, amount: f64, currency: &str) -> Result<RazorpayOrder, PaymentError> {
        let body = json!({
            "amount": to_minor_units(amount),
            "currency": currency.to_uppercase(),
            "receipt": format!("order_{}", Uuid::new_v4()),
            "payment_capture": 1,
        });

        let order: RazorpayOrderResponse = self
            .send(self.http.post(format!("{}/orders", API_BASE)).json(&body))
            .await?;
        info!("Razorpay order {} created", order.id);

        Ok(RazorpayOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
        })
    }

    /// Parses a webhook body, checking `X-Razorpay-Signature` when a webhook
    /// secret is configured.
    pub fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<Option<WebhookUpdate>, PaymentError> {
        if let Some(secret) = self.webhook_secret.as_deref() {
            let signature = signature.ok_or(PaymentError::InvalidSignature)?;
            if !verify(secret, payload, signature) {
                return Err(PaymentError::InvalidSignature);
            }
        }

        let webhook: RazorpayWebhook = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::Webhook(e.to_string()))?;

        let status = match webhook.event.as_str() {
            "payment.captured" => "completed",
            "payment.failed" => "failed",
            other => {
                info!("Unhandled Razorpay event: {}", other);
                return Ok(None);
            }
        };

        let payment_id = webhook
            .payment_id()
            .ok_or_else(|| PaymentError::Webhook("missing payment entity".to_string()))?;

        Ok(Some(WebhookUpdate {
            payment_id: payment_id.to_string(),
            status,
        }))
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn charge(
        &self,
        _amount: f64,
        _currency: &str,
        details: &PaymentDetails,
    ) -> Result<ChargeOutcome, PaymentError> {
        let credentials = self.credentials()?;
        let order_id = details
            .order_id
            .as_deref()
            .ok_or(PaymentError::MissingDetail("orderId"))?;
        let payment_id = details
            .payment_id
            .as_deref()
            .ok_or(PaymentError::MissingDetail("paymentId"))?;
        let signature = details
            .signature
            .as_deref()
            .ok_or(PaymentError::MissingDetail("signature"))?;

        if !verify_payment_signature(&credentials.key_secret, order_id, payment_id, signature) {
            return Err(PaymentError::InvalidSignature);
        }

        let payment = self.fetch_payment(payment_id).await?;
        if payment.status != "captured" {
            return Err(PaymentError::Declined(format!(
                "Payment not captured. Status: {}",
                payment.status
            )));
        }

        Ok(ChargeOutcome {
            payment_id: payment.id.clone(),
            transaction_id: payment.id,
            status: "completed".to_string(),
            client_secret: None,
            approval_url: None,
        })
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
        reason: &str,
    ) -> Result<RefundReceipt, PaymentError> {
        let mut body = json!({ "notes": { "reason": reason } });
        if let Some(amount) = amount {
            body["amount"] = json!(to_minor_units(amount));
        }

        let refund: RazorpayRefund = self
            .send(
                self.http
                    .post(format!("{}/payments/{}/refund", API_BASE, payment_id))
                    .json(&body),
            )
            .await?;

        Ok(RefundReceipt {
            refund_id: refund.id,
            status: refund.status,
            amount: refund.amount.map(|a| a as f64 / 100.0).or(amount),
        })
    }

    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, PaymentError> {
        let payment = self.fetch_payment(payment_id).await?;
        Ok(PaymentStatus {
            payment_id: payment.id,
            status: payment.status,
            amount: payment.amount.map(|a| a as f64 / 100.0),
            currency: payment.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, message: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_round_trip() {
        let signature = sign("key_secret", b"order_1|pay_1");
        assert_eq!(signature.len(), 64);
        assert!(verify_payment_signature("key_secret", "order_1", "pay_1", &signature));
        assert!(!verify_payment_signature("key_secret", "order_1", "pay_2", &signature));
        assert!(!verify_payment_signature("other", "order_1", "pay_1", &signature));
    }

    #[test]
    fn test_verify_rejects_non_hex() {
        assert!(!verify("secret", b"body", "not-hex"));
    }

    #[test]
    fn test_webhook_maps_events() {
        let gateway = RazorpayGateway::new(None, None, None);
        let body = br#"{"event":"payment.captured","payload":{"payment":{"entity":{"id":"pay_9"}}}}"#;

        assert_eq!(
            gateway.handle_webhook(body, None).unwrap(),
            Some(WebhookUpdate {
                payment_id: "pay_9".to_string(),
                status: "completed",
            })
        );

        let other = br#"{"event":"order.paid","payload":{}}"#;
        assert_eq!(gateway.handle_webhook(other, None).unwrap(), None);
    }

    #[test]
    fn test_webhook_signature_enforced_when_secret_set() {
        let gateway = RazorpayGateway::new(None, None, Some("whsec".to_string()));
        let body = br#"{"event":"payment.failed","payload":{"payment":{"entity":{"id":"pay_3"}}}}"#;

        assert!(matches!(
            gateway.handle_webhook(body, Some("deadbeef")),
            Err(PaymentError::InvalidSignature)
        ));

        let signature = sign("whsec", body);
        let update = gateway.handle_webhook(body, Some(&signature)).unwrap().unwrap();
        assert_eq!(update.status, "failed");
    }
}

pub mod interface;
pub mod paypal;
pub mod razorpay;
pub mod stripe;

use chrono::Utc;
use log::{error, info, warn};
use mongodb::{bson::doc, Collection, Database};

use crate::config::AppConfig;
use crate::db::mongo::PAYMENTS;
use crate::error::{ApiError, ApiResult};
use crate::models::payment::{
    ChargeOutcome, ChargeRequest, PaymentMethod, PaymentReceipt, PaymentRecord, PaymentStatus,
    RazorpayOrder, RefundReceipt, StripeIntent,
};

use self::interface::{PaymentError, PaymentGateway, WebhookUpdate};
use self::paypal::PayPalGateway;
use self::razorpay::RazorpayGateway;
use self::stripe::StripeGateway;

pub const DEFAULT_REFUND_REASON: &str = "requested_by_customer";

pub struct PaymentService {
    stripe: StripeGateway,
    razorpay: RazorpayGateway,
    paypal: PayPalGateway,
    payments: Collection<PaymentRecord>,
}

impl PaymentService {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        Self {
            stripe: StripeGateway::new(
                config.stripe_secret_key.clone(),
                config.stripe_webhook_secret.clone(),
            ),
            razorpay: RazorpayGateway::new(
                config.razorpay_key_id.clone(),
                config.razorpay_key_secret.clone(),
                config.razorpay_webhook_secret.clone(),
            ),
            paypal: PayPalGateway::new(
                config.paypal_base_url(),
                config.paypal_client_id.clone(),
                config.paypal_client_secret.clone(),
            ),
            payments: db.collection(PAYMENTS),
        }
    }

    /// `(method, configured)` for each gateway.
    pub fn gateways(&self) -> [(PaymentMethod, bool); 3] {
        [
            (PaymentMethod::Stripe, self.stripe.is_configured()),
            (PaymentMethod::Razorpay, self.razorpay.is_configured()),
            (PaymentMethod::PayPal, self.paypal.is_configured()),
        ]
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
        let ChargeRequest {
            amount,
            currency,
            details,
            ..
        } = request;

        match request.method {
            PaymentMethod::Stripe => self.stripe.charge(*amount, currency, details).await,
            PaymentMethod::PayPal => self.paypal.charge(*amount, currency, details).await,
            PaymentMethod::Razorpay => self.razorpay.charge(*amount, currency, details).await,
        }
    }

    /// Charges through the requested gateway and records the payment. Any
    /// gateway failure is reported as a failed payment. A completed charge
    /// always returns a receipt; `recorded` says whether it was stored.
    pub async fn process(&self, request: ChargeRequest) -> ApiResult<PaymentReceipt> {
        if !(request.amount > 0.0) {
            return Err(ApiError::BadRequest(
                "Amount must be a positive number".to_string(),
            ));
        }

        let outcome = self.charge(&request).await.map_err(|e| {
            error!("{} payment error: {}", request.method, e);
            ApiError::PaymentFailed(e.to_string())
        })?;

        let record = PaymentRecord {
            id: outcome.payment_id.clone(),
            user_id: request.user_id.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            payment_method: request.method,
            status: outcome.status.clone(),
            transaction_id: outcome.transaction_id.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let recorded = match self.payments.insert_one(&record).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to record payment {}: {}", record.id, e);
                false
            }
        };
        info!(
            "{} payment {} for user {}: {}",
            request.method, outcome.payment_id, request.user_id, outcome.status
        );

        Ok(PaymentReceipt::new(request, outcome, recorded))
    }

    pub async fn create_razorpay_order(&self, amount: f64, currency: &str) -> ApiResult<RazorpayOrder> {
        Ok(self.razorpay.create_order(amount, currency).await?)
    }

    pub async fn create_stripe_intent(&self, amount: f64, currency: &str) -> ApiResult<StripeIntent> {
        Ok(self.stripe.create_intent(amount, currency).await?)
    }

    pub async fn refund(
        &self,
        payment_id: &str,
        method: PaymentMethod,
        amount: Option<f64>,
        reason: Option<&str>,
    ) -> ApiResult<RefundReceipt> {
        let reason = reason.unwrap_or(DEFAULT_REFUND_REASON);
        let receipt = match method {
            PaymentMethod::Stripe => self.stripe.refund(payment_id, amount, reason).await,
            PaymentMethod::PayPal => self.paypal.refund(payment_id, amount, reason).await,
            PaymentMethod::Razorpay => self.razorpay.refund(payment_id, amount, reason).await,
        }
        .map_err(|e| {
            error!("Refund of {} failed: {}", payment_id, e);
            e
        })?;

        self.set_status(payment_id, "refunded").await;
        Ok(receipt)
    }

    pub async fn status(&self, payment_id: &str, method: PaymentMethod) -> ApiResult<PaymentStatus> {
        let status = match method {
            PaymentMethod::Stripe => self.stripe.status(payment_id).await,
            PaymentMethod::PayPal => self.paypal.status(payment_id).await,
            PaymentMethod::Razorpay => self.razorpay.status(payment_id).await,
        }?;
        Ok(status)
    }

    pub async fn stripe_webhook(&self, payload: &str, signature: &str) -> ApiResult<()> {
        if let Some(update) = self.stripe.handle_webhook(payload, signature)? {
            self.apply(update).await;
        }
        Ok(())
    }

    pub async fn razorpay_webhook(&self, payload: &[u8], signature: Option<&str>) -> ApiResult<()> {
        if let Some(update) = self.razorpay.handle_webhook(payload, signature)? {
            self.apply(update).await;
        }
        Ok(())
    }

    async fn apply(&self, update: WebhookUpdate) {
        info!("Payment {} {}", update.payment_id, update.status);
        self.set_status(&update.payment_id, update.status).await;
    }

    /// Best effort; payments made outside this service have no record.
    async fn set_status(&self, payment_id: &str, status: &str) {
        let now = match bson::to_bson(&Utc::now()) {
            Ok(now) => now,
            Err(e) => {
                error!("Failed to encode timestamp: {}", e);
                return;
            }
        };

        match self
            .payments
            .update_one(
                doc! { "_id": payment_id },
                doc! { "$set": { "status": status, "updatedAt": now } },
            )
            .await
        {
            Ok(result) if result.matched_count == 0 => {
                warn!("No payment record for {}", payment_id)
            }
            Ok(_) => {}
            Err(e) => error!("Failed to update payment {}: {}", payment_id, e),
        }
    }
}

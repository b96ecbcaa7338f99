use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Amount;
use crate::models::payment::{ChargeRequest, PaymentDetails, PaymentMethod};
use crate::routes::success;
use crate::state::AppState;

const STRIPE_SIGNATURE: &str = "stripe-signature";
const RAZORPAY_SIGNATURE: &str = "x-razorpay-signature";

pub fn parse_method(method: Option<&str>) -> ApiResult<PaymentMethod> {
    method
        .ok_or_else(|| ApiError::BadRequest("Payment method is required".to_string()))?
        .parse()
        .map_err(ApiError::BadRequest)
}

fn positive_amount(amount: Option<&Amount>) -> ApiResult<f64> {
    amount
        .map(Amount::as_cost)
        .filter(|a| *a > 0.0)
        .ok_or_else(|| ApiError::BadRequest("Amount is required".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInput {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<PaymentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct AmountInput {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundInput {
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub amount: Option<f64>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub payment_method: Option<String>,
}

pub async fn process(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<ProcessInput>,
) -> ApiResult<HttpResponse> {
    let ProcessInput {
        amount,
        currency,
        payment_method,
        payment_details,
    } = input.into_inner();

    let (Some(amount), Some(method), Some(details)) = (amount, payment_method, payment_details)
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: amount, paymentMethod, paymentDetails".to_string(),
        ));
    };

    let receipt = state
        .payments
        .process(ChargeRequest {
            user_id: user.user_id,
            amount: amount.as_cost(),
            currency: currency.unwrap_or_else(|| "USD".to_string()),
            method: parse_method(Some(&method))?,
            details,
        })
        .await?;
    Ok(success("payment", receipt, "Payment processed successfully"))
}

pub async fn razorpay_order(
    state: web::Data<AppState>,
    input: web::Json<AmountInput>,
) -> ApiResult<HttpResponse> {
    let amount = positive_amount(input.amount.as_ref())?;
    let currency = input.currency.as_deref().unwrap_or("INR");
    let order = state.payments.create_razorpay_order(amount, currency).await?;
    Ok(success("order", order, "Razorpay order created successfully"))
}

pub async fn stripe_intent(
    state: web::Data<AppState>,
    input: web::Json<AmountInput>,
) -> ApiResult<HttpResponse> {
    let amount = positive_amount(input.amount.as_ref())?;
    let currency = input.currency.as_deref().unwrap_or("USD");
    let intent = state.payments.create_stripe_intent(amount, currency).await?;
    Ok(success(
        "paymentIntent",
        intent,
        "Stripe payment intent created successfully",
    ))
}

pub async fn refund(
    state: web::Data<AppState>,
    input: web::Json<RefundInput>,
) -> ApiResult<HttpResponse> {
    let (Some(payment_id), Some(method)) = (input.payment_id.as_deref(), input.payment_method.as_deref())
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: paymentId, paymentMethod".to_string(),
        ));
    };

    let receipt = state
        .payments
        .refund(
            payment_id,
            parse_method(Some(method))?,
            input.amount,
            input.reason.as_deref(),
        )
        .await?;
    Ok(success("refund", receipt, "Refund processed successfully"))
}

pub async fn status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<StatusQuery>,
) -> ApiResult<HttpResponse> {
    let method = parse_method(query.payment_method.as_deref())?;
    let status = state.payments.status(&path, method).await?;
    Ok(success("payment", status, "Payment status retrieved successfully"))
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

pub async fn stripe_webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = header(&req, STRIPE_SIGNATURE)
        .ok_or_else(|| ApiError::BadRequest("Missing Stripe signature".to_string()))?;
    let payload = std::str::from_utf8(&body)
        .map_err(|_| ApiError::BadRequest("Webhook payload is not UTF-8".to_string()))?;

    state.payments.stripe_webhook(payload, signature).await?;
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

pub async fn razorpay_webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    state
        .payments
        .razorpay_webhook(&body, header(&req, RAZORPAY_SIGNATURE))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method(Some("Stripe")).unwrap(), PaymentMethod::Stripe);
        assert!(matches!(parse_method(Some("bitcoin")), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_method(None), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_positive_amount() {
        assert_eq!(positive_amount(Some(&Amount::Text("1,500".into()))).unwrap(), 1500.0);
        assert!(positive_amount(Some(&Amount::Number(0.0))).is_err());
        assert!(positive_amount(None).is_err());
    }
}

use actix_web::{web, HttpResponse};

use crate::error::ApiResult;
use crate::routes::{required, success};
use crate::services::notification_service::{EmailRequest, SmsRequest};
use crate::state::AppState;

pub async fn email(
    state: web::Data<AppState>,
    input: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    required(Some(input.email.as_str()), "Email is required")?;
    required(Some(input.booking_id.as_str()), "bookingId is required")?;

    let receipt = state.notifications.send_confirmation_email(input.into_inner());
    Ok(success("emailData", receipt, "Confirmation email sent successfully"))
}

pub async fn sms(state: web::Data<AppState>, input: web::Json<SmsRequest>) -> ApiResult<HttpResponse> {
    required(Some(input.phone.as_str()), "Phone number is required")?;
    required(Some(input.message.as_str()), "Message is required")?;

    let receipt = state.notifications.send_sms(input.into_inner());
    Ok(success("smsData", receipt, "SMS sent successfully"))
}

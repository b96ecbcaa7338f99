pub mod ai;
pub mod analytics;
pub mod ar;
pub mod auth;
pub mod booking;
pub mod emt;
pub mod health;
pub mod maps;
pub mod multilingual;
pub mod notifications;
pub mod payment;
pub mod sustainability;
pub mod trips;
pub mod voice;

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;

pub const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// `{"success": true, <key>: value, "message": ...}`
pub fn success<T: Serialize>(key: &str, value: T, message: &str) -> HttpResponse {
    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(
        key.to_string(),
        serde_json::to_value(value).unwrap_or(Value::Null),
    );
    body.insert("message".to_string(), json!(message));
    HttpResponse::Ok().json(Value::Object(body))
}

/// Non-empty trimmed string or a 400 naming the field.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

/// Every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::profile))
                        .route(web::put().to(auth::update_profile)),
                ),
        )
        .service(
            web::scope("/ai")
                .route("/generate-itinerary", web::post().to(ai::generate_itinerary))
                .route("/recommendations", web::post().to(ai::recommendations))
                .route("/weather-adjustments", web::post().to(ai::weather_adjustments))
                .route("/social-templates", web::post().to(ai::social_templates))
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware)
                        .route("/analyze-preferences", web::post().to(ai::analyze_preferences))
                        .route("/adjust-itinerary", web::post().to(ai::adjust_itinerary)),
                ),
        )
        .service(
            web::scope("/trips")
                .route(
                    "/popular-destinations",
                    web::get().to(trips::popular_destinations),
                )
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware)
                        .route("/history", web::get().to(trips::history))
                        .route("/save", web::post().to(trips::save))
                        .route("/{id}/share", web::post().to(trips::share))
                        .route("/{id}", web::get().to(trips::get))
                        .route("/{id}", web::put().to(trips::update))
                        .route("/{id}", web::delete().to(trips::delete)),
                ),
        )
        .service(
            web::scope("/booking")
                .wrap(AuthMiddleware)
                .route("/book", web::post().to(booking::book))
                .route("/create", web::post().to(booking::create))
                .route("/my-bookings", web::get().to(booking::my_bookings))
                .route("/status/{id}", web::get().to(booking::status))
                .route("/cancel/{id}", web::post().to(booking::cancel))
                .route("/{id}", web::get().to(booking::details)),
        )
        .service(
            web::scope("/payment")
                .route("/stripe/webhook", web::post().to(payment::stripe_webhook))
                .route("/razorpay/webhook", web::post().to(payment::razorpay_webhook))
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware)
                        .route("/process", web::post().to(payment::process))
                        .route("/razorpay/order", web::post().to(payment::razorpay_order))
                        .route("/stripe/intent", web::post().to(payment::stripe_intent))
                        .route("/refund", web::post().to(payment::refund))
                        .route("/status/{id}", web::get().to(payment::status)),
                ),
        )
        .service(
            web::scope("/maps")
                .route("/destination/{name}", web::get().to(maps::destination))
                .route("/weather", web::get().to(maps::weather))
                .route("/search", web::get().to(maps::search))
                .route("/place/{id}", web::get().to(maps::place))
                .route("/nearby", web::get().to(maps::nearby))
                .route("/geocode", web::get().to(maps::geocode))
                .route("/places/{destination}", web::get().to(maps::places))
                .route("/attractions/{destination}", web::get().to(maps::attractions))
                .route("/restaurants/{destination}", web::get().to(maps::restaurants))
                .route("/directions", web::get().to(maps::directions))
                .route("/transport-options", web::get().to(maps::transport_options))
                .route("/traffic", web::get().to(maps::traffic))
                .route("/distance-matrix", web::post().to(maps::distance_matrix))
                .route("/route", web::post().to(maps::route)),
        )
        .service(
            web::scope("/multilingual")
                .route("/translate", web::post().to(multilingual::translate))
                .route("/phrases", web::post().to(multilingual::phrases))
                .route("/detect", web::post().to(multilingual::detect))
                .route("/cultural-tips", web::post().to(multilingual::cultural_tips))
                .route("/localize-itinerary", web::post().to(multilingual::localize_itinerary))
                .route("/languages", web::get().to(multilingual::languages))
                .route("/context/{destination}", web::get().to(multilingual::context)),
        )
        .service(
            web::scope("/sustainability")
                .route("/carbon-footprint", web::post().to(sustainability::carbon_footprint))
                .route("/local-impact", web::post().to(sustainability::local_impact))
                .route("/report", web::post().to(sustainability::report))
                .route("/alternatives", web::post().to(sustainability::alternatives))
                .route("/progress", web::post().to(sustainability::progress)),
        )
        .service(
            web::scope("/analytics")
                .wrap(AuthMiddleware)
                .route("/insights/{user_id}", web::get().to(analytics::insights))
                .route("/dashboard/{user_id}", web::get().to(analytics::dashboard))
                .route("/track-recommendation", web::post().to(analytics::track_recommendation)),
        )
        .service(
            web::scope("/emt")
                .route("/search", web::post().to(emt::search))
                .route("/search/{kind}", web::post().to(emt::search_kind))
                .route("/availability", web::post().to(emt::availability))
                .route("/book", web::post().to(emt::book))
                .route("/book-itinerary", web::post().to(emt::book_itinerary))
                .route("/item/{id}", web::get().to(emt::item))
                .route("/pricing", web::get().to(emt::pricing))
                .route("/categories", web::get().to(emt::categories))
                .route("/booking-statuses", web::get().to(emt::booking_statuses))
                .route("/booking/{id}", web::get().to(emt::booking))
                .route("/booking/{id}/confirmation", web::get().to(emt::confirmation))
                .route("/booking/{id}/cancel", web::post().to(emt::cancel))
                .route("/booking/{id}/modify", web::post().to(emt::modify))
                .service(
                    web::resource("/history")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(emt::history)),
                ),
        )
        .service(
            web::scope("/voice")
                .route("/process", web::post().to(voice::process))
                .route("/commands", web::get().to(voice::commands))
                .route("/status", web::get().to(voice::status)),
        )
        .service(
            web::scope("/ar")
                .route("/content", web::post().to(ar::content))
                .route("/experiences", web::post().to(ar::experiences))
                .route("/photo-filters", web::post().to(ar::photo_filters))
                .route("/games", web::post().to(ar::games))
                .route("/social", web::post().to(ar::social))
                .route("/navigation", web::post().to(ar::navigation))
                .route("/landmarks/{destination}", web::get().to(ar::landmarks))
                .route("/categories", web::get().to(ar::categories))
                .route("/accessibility", web::get().to(ar::accessibility)),
        )
        .service(
            web::scope("/notifications")
                .route("/email", web::post().to(notifications::email))
                .route("/sms", web::post().to(notifications::sms)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_success_envelope() {
        let response = success("places", vec!["Baga", "Anjuna"], "Places retrieved");
        let body = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["places"][1], "Anjuna");
        assert_eq!(body["message"], "Places retrieved");
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some(" Goa "), "x").unwrap(), "Goa");
        assert!(matches!(required(Some("  "), "x"), Err(ApiError::BadRequest(_))));
        assert!(required(None, "x").is_err());
    }
}

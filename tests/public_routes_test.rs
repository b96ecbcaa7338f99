mod common;

use std::time::Duration;

use actix_web::{http::header, test, web, App};
use serde_json::{json, Value};
use serial_test::serial;

use trip_planner_api::{middleware::rate_limit::RateLimit, routes};

use common::{status_of, TestApp};

#[actix_rt::test]
#[serial]
async fn test_health_check() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert!(body["status"] == "healthy" || body["status"] == "degraded");
    assert_eq!(body["services"]["gemini"]["status"], "not_configured");
    assert_eq!(body["services"]["stripe"]["status"], "not_configured");
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_requires_parameters() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/generate-itinerary")
        .set_json(json!({"destination": "Goa", "duration": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required itinerary parameters");
}

#[actix_rt::test]
#[serial]
async fn test_malformed_json_is_bad_request() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/generate-itinerary")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"destination\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_popular_destinations() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trips/popular-destinations")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(!body["destinations"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_static_catalogues() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        ("/api/voice/commands", "commands"),
        ("/api/emt/categories", "categories"),
        ("/api/emt/booking-statuses", "statuses"),
        ("/api/ar/landmarks/Mumbai", "landmarks"),
        ("/api/ar/categories", "categories"),
        ("/api/multilingual/languages", "languages"),
    ];

    for (uri, key) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "{} failed", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true, "{}", uri);
        assert!(!body[key].is_null(), "{} missing {}", uri, key);
    }
}

#[actix_rt::test]
#[serial]
async fn test_unknown_landmark_city_is_empty() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/ar/landmarks/Atlantis")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["landmarks"], json!([]));
}

#[actix_rt::test]
#[serial]
async fn test_weather_requires_destination() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/maps/weather").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_voice_process_requires_input() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/voice/process")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_emt_search_rejects_unknown_kind() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/emt/search/spaceflight")
        .set_json(json!({"destination": "Goa"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_emt_book_validates_request() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/emt/book")
        .set_json(json!({"itemId": "FL-1", "category": "transportation"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Missing required fields: startDate, customerInfo, paymentInfo"
    );
}

#[actix_rt::test]
#[serial]
async fn test_sustainability_requires_itinerary() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/sustainability/local-impact")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_confirmation_email_is_echoed() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/notifications/email")
        .set_json(json!({
            "email": "traveler@example.com",
            "bookingId": "BK-1001",
            "itinerary": {"destination": "Jaipur"}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["emailData"]["to"], "traveler@example.com");
    assert_eq!(body["emailData"]["bookingId"], "BK-1001");
}

#[actix_rt::test]
#[serial]
async fn test_rate_limit_rejects_excess_requests() {
    let test_app = TestApp::new().await;
    let app = test::init_service(
        App::new().app_data(test_app.state.clone()).service(
            web::scope("/api")
                .wrap(RateLimit::new(2, Duration::from_secs(60)))
                .configure(routes::configure),
        ),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/api/voice/status").to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 200);
    }

    let req = test::TestRequest::get().uri("/api/voice/status").to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 429);
}

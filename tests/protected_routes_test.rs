mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::{status_of, TestApp, TEST_USER_ID};

#[actix_rt::test]
#[serial]
async fn test_protected_routes_require_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let requests = [
        test::TestRequest::get().uri("/api/auth/profile"),
        test::TestRequest::get().uri("/api/trips/history"),
        test::TestRequest::get().uri("/api/booking/my-bookings"),
        test::TestRequest::post().uri("/api/payment/process"),
        test::TestRequest::get().uri("/api/emt/history"),
        test::TestRequest::post().uri("/api/ai/adjust-itinerary"),
        test::TestRequest::get().uri(&format!("/api/analytics/insights/{}", TEST_USER_ID)),
    ];

    for req in requests {
        let req = req.to_request();
        let uri = req.uri().to_string();
        let status = status_of(test::try_call_service(&app, req).await);
        assert_eq!(status, 401, "{} should require a token", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_invalid_token_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trips/history")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 401);
}

#[actix_rt::test]
#[serial]
async fn test_popular_destinations_stay_public() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trips/popular-destinations")
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 200);
}

#[actix_rt::test]
#[serial]
async fn test_analytics_are_private_to_owner() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/analytics/dashboard/someone-else")
        .insert_header(test_app.bearer())
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 403);
}

#[actix_rt::test]
#[serial]
async fn test_adjust_itinerary_requires_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/adjust-itinerary")
        .insert_header(test_app.bearer())
        .set_json(json!({"feedback": "more museums"}))
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[serial]
async fn test_track_recommendation_rejects_unknown_action() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/analytics/track-recommendation")
        .insert_header(test_app.bearer())
        .set_json(json!({"recommendationId": "rec-1", "action": "teleported"}))
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 400);
}

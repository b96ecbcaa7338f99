mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;

use common::{status_of, TestApp, TEST_USER_ID};

const OTHER_USER_ID: &str = "other-user-456";

fn trip() -> Value {
    json!({
        "params": { "destination": "Goa", "duration": 3, "interests": ["beach"] },
        "itinerary": {
            "days": [
                {
                    "day": 1,
                    "date": "2026-12-20",
                    "activities": [
                        { "activity": "Scuba dive", "bookingRequired": true, "cost": 3500, "time": "09:00" }
                    ]
                }
            ]
        },
        "bookingInfo": {
            "accommodations": [
                { "name": "Zostel", "provider": "Hostelworld", "guests": 2, "price": 900 }
            ]
        },
        "status": "generated"
    })
}

#[actix_rt::test]
#[serial]
#[ignore = "requires MongoDB at MONGODB_URI"]
async fn test_trip_lifecycle_with_owner_checks() {
    let test_app = TestApp::with_database().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/save")
        .insert_header(test_app.bearer())
        .set_json(trip())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["itineraryId"].as_str().unwrap().to_string();
    let uri = format!("/api/trips/{}", id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(test_app.bearer())
        .set_json(json!({ "status": 123 }))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 400);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(test_app.bearer())
        .set_json(json!({ "status": "finalized", "userId": OTHER_USER_ID }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["itinerary"]["status"], "finalized");
    assert_eq!(body["itinerary"]["userId"], TEST_USER_ID);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(test_app.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["itinerary"]["status"], "finalized");
    assert_eq!(body["itinerary"]["params"]["destination"], "Goa");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(test_app.bearer_for(OTHER_USER_ID))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

    let req = test::TestRequest::post()
        .uri(&format!("{}/share", uri))
        .insert_header(test_app.bearer_for(OTHER_USER_ID))
        .set_json(json!({ "shareWith": ["friend@example.com"] }))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

    let req = test::TestRequest::post()
        .uri(&format!("{}/share", uri))
        .insert_header(test_app.bearer())
        .set_json(json!({ "shareWith": ["friend@example.com"] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["shareId"].is_string());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(test_app.bearer_for(OTHER_USER_ID))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(test_app.bearer())
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 200);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(test_app.bearer())
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 404);
}

#[actix_rt::test]
#[serial]
#[ignore = "requires MongoDB at MONGODB_URI"]
async fn test_booking_create_status_and_cancel() {
    let test_app = TestApp::with_database().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/save")
        .insert_header(test_app.bearer())
        .set_json(trip())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let itinerary_id = body["itineraryId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/booking/create")
        .insert_header(test_app.bearer_for(OTHER_USER_ID))
        .set_json(json!({ "itineraryId": itinerary_id }))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

    let req = test::TestRequest::post()
        .uri("/api/booking/create")
        .insert_header(test_app.bearer())
        .set_json(json!({
            "itineraryId": itinerary_id,
            "travelerDetails": { "email": "test@example.com" },
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["totalCost"], 4400.0);
    let booking_id = body["booking"]["_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/trips/{}", itinerary_id))
        .insert_header(test_app.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["itinerary"]["status"], "booked");
    assert_eq!(body["itinerary"]["bookingId"], booking_id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/api/booking/status/{}", booking_id))
        .insert_header(test_app.bearer_for(OTHER_USER_ID))
        .to_request();
    assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

    let req = test::TestRequest::post()
        .uri(&format!("/api/booking/cancel/{}", booking_id))
        .insert_header(test_app.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["cancellation"]["status"], "cancelled");
    assert_eq!(body["cancellation"]["refund"]["status"], "pending");
    assert_eq!(
        body["cancellation"]["refund"]["reason"],
        "User requested cancellation"
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/booking/status/{}", booking_id))
        .insert_header(test_app.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["booking"]["status"], "cancelled");
}

mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;

use common::{status_of, TestApp};

#[actix_rt::test]
#[serial]
async fn test_process_requires_fields() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payment/process")
        .insert_header(test_app.bearer())
        .set_json(json!({"amount": 120.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Missing required fields: amount, paymentMethod, paymentDetails"
    );
}

#[actix_rt::test]
#[serial]
async fn test_unknown_payment_method() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payment/process")
        .insert_header(test_app.bearer())
        .set_json(json!({
            "amount": 120.0,
            "paymentMethod": "cheque",
            "paymentDetails": {}
        }))
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[serial]
async fn test_stripe_webhook_requires_signature() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payment/stripe/webhook")
        .set_payload(r#"{"type":"payment_intent.succeeded"}"#)
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[serial]
async fn test_payment_routes_require_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payment/refund")
        .set_json(json!({"paymentId": "pi_1", "paymentMethod": "stripe"}))
        .to_request();
    let status = status_of(test::try_call_service(&app, req).await);
    assert_eq!(status, 401);
}

#![allow(dead_code)]

use std::time::Duration;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    web, App, Error,
};

use trip_planner_api::{
    config::AppConfig,
    db::mongo::{create_lazy_client, create_mongo_client},
    middleware::auth::generate_token,
    routes,
    state::AppState,
};

pub const TEST_USER_ID: &str = "test-user-123";
pub const TEST_EMAIL: &str = "test@example.com";

/// App wired exactly like the server, minus the network-facing middleware.
/// The database client never connects; routes that touch it fail fast.
pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig::for_tests();
        let client = create_lazy_client(&config.mongodb_uri, Duration::from_millis(200))
            .await
            .expect("lazy mongo client");

        Self {
            state: web::Data::new(AppState::new(config, client)),
        }
    }

    /// Connected to the database at `MONGODB_URI`, for the flows that persist.
    pub async fn with_database() -> Self {
        let mut config = AppConfig::for_tests();
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.mongodb_uri = uri;
        }
        let client = create_mongo_client(&config.mongodb_uri)
            .await
            .expect("mongo client");

        Self {
            state: web::Data::new(AppState::new(config, client)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .service(web::scope("/api").configure(routes::configure))
    }

    pub fn bearer(&self) -> (&'static str, String) {
        self.bearer_for(TEST_USER_ID)
    }

    pub fn bearer_for(&self, user_id: &str) -> (&'static str, String) {
        let config = &self.state.config;
        let token = generate_token(
            &config.jwt_secret,
            config.jwt_expiry_hours,
            user_id,
            TEST_EMAIL,
            "Test User",
        )
        .expect("token");
        ("Authorization", format!("Bearer {}", token))
    }
}

/// Middleware rejections surface as `Err` from the test service rather than
/// as a response.
pub fn status_of<B>(result: Result<ServiceResponse<B>, Error>) -> StatusCode {
    match result {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

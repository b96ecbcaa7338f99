use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;

use crate::db::mongo;
use crate::models::payment::PaymentMethod;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    version: &'static str,
    environment: String,
    services: BTreeMap<&'static str, ServiceStatus>,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ServiceStatus {
    fn ok() -> Self {
        Self {
            status: "ok",
            details: None,
        }
    }

    fn error(details: impl Into<String>) -> Self {
        Self {
            status: "error",
            details: Some(details.into()),
        }
    }

    fn not_configured(key: &str) -> Self {
        Self {
            status: "not_configured",
            details: Some(format!("{} not set", key)),
        }
    }

    fn configured(configured: bool, key: &str) -> Self {
        if configured {
            Self::ok()
        } else {
            Self::not_configured(key)
        }
    }
}

fn overall(services: &BTreeMap<&'static str, ServiceStatus>) -> &'static str {
    if services.values().any(|s| s.status == "error") {
        "degraded"
    } else {
        "ok"
    }
}

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut services = BTreeMap::new();

    let database = match mongo::ping(&state.db).await {
        Ok(()) => ServiceStatus::ok(),
        Err(e) => ServiceStatus::error(e.to_string()),
    };
    services.insert("mongodb", database);
    services.insert(
        "gemini",
        ServiceStatus::configured(state.ai.is_configured(), "GEMINI_API_KEY"),
    );
    services.insert(
        "google_maps",
        ServiceStatus::configured(state.maps.is_configured(), "GOOGLE_MAPS_API_KEY"),
    );
    services.insert(
        "openweather",
        ServiceStatus::configured(state.maps.weather_configured(), "OPENWEATHER_API_KEY"),
    );
    for (method, configured) in state.payments.gateways() {
        let name = match method {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Razorpay => "razorpay",
        };
        services.insert(name, ServiceStatus::configured(configured, "gateway credentials"));
    }
    services.insert(
        "emt_booking",
        ServiceStatus::configured(state.config.emt_api_url.is_some(), "EMT_API_URL"),
    );

    HttpResponse::Ok().json(HealthStatus {
        status: overall(&services),
        message: "Trip planner API is running",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        services,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_do_not_degrade() {
        let mut services = BTreeMap::new();
        services.insert("mongodb", ServiceStatus::ok());
        services.insert("gemini", ServiceStatus::not_configured("GEMINI_API_KEY"));
        assert_eq!(overall(&services), "ok");

        services.insert("mongodb", ServiceStatus::error("connection refused"));
        assert_eq!(overall(&services), "degraded");
    }
}

use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};
use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub frontend_url: String,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub google_maps_api_key: Option<String>,
    pub openweather_api_key: Option<String>,
    pub emt_api_key: String,
    pub emt_base_url: String,
    pub emt_api_url: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub razorpay_webhook_secret: Option<String>,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<String>,
    pub paypal_mode: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongodb_uri = optional("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?;

        Ok(Self {
            host: try_load("HOST", HOST.to_string()),
            port: try_load("PORT", PORT),
            mongodb_uri,
            database: try_load("MONGODB_DATABASE", "trip_planner".to_string()),
            jwt_secret: optional("JWT_SECRET").unwrap_or_else(|| {
                warn!("JWT_SECRET not set, falling back to an insecure development secret");
                "default_secret".to_string()
            }),
            jwt_expiry_hours: try_load("JWT_EXPIRES_IN_HOURS", 24 * 7),
            frontend_url: try_load("FRONTEND_URL", "http://localhost:3000".to_string()),
            rate_limit_max: try_load("RATE_LIMIT_MAX", 100),
            rate_limit_window_secs: try_load("RATE_LIMIT_WINDOW_SECS", 15 * 60),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: try_load("GEMINI_MODEL", "gemini-pro".to_string()),
            google_maps_api_key: optional("GOOGLE_MAPS_API_KEY"),
            openweather_api_key: optional("OPENWEATHER_API_KEY"),
            emt_api_key: try_load("EMT_API_KEY", "demo-key".to_string()),
            emt_base_url: try_load("EMT_BASE_URL", "https://api.emt.com/v1".to_string()),
            emt_api_url: optional("EMT_API_URL"),
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            razorpay_key_id: optional("RAZORPAY_KEY_ID"),
            razorpay_key_secret: optional("RAZORPAY_KEY_SECRET"),
            razorpay_webhook_secret: optional("RAZORPAY_WEBHOOK_SECRET"),
            paypal_client_id: optional("PAYPAL_CLIENT_ID"),
            paypal_client_secret: optional("PAYPAL_CLIENT_SECRET"),
            paypal_mode: try_load("PAYPAL_MODE", "sandbox".to_string()),
        })
    }

    /// Configuration with every optional integration switched off, pointing at a
    /// local database. Used by the integration test harness.
    pub fn for_tests() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "trip_planner_test".to_string(),
            jwt_secret: "test_secret".to_string(),
            jwt_expiry_hours: 1,
            frontend_url: "http://localhost:3000".to_string(),
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
            gemini_api_key: None,
            gemini_model: "gemini-pro".to_string(),
            google_maps_api_key: None,
            openweather_api_key: None,
            emt_api_key: "demo-key".to_string(),
            emt_base_url: "http://127.0.0.1:9".to_string(),
            emt_api_url: None,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            razorpay_key_id: None,
            razorpay_key_secret: None,
            razorpay_webhook_secret: None,
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_mode: "sandbox".to_string(),
        }
    }

    pub fn paypal_base_url(&self) -> &'static str {
        if self.paypal_mode == "live" {
            "https://api.paypal.com"
        } else {
            "https://api.sandbox.paypal.com"
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value ({e}), using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paypal_base_url_follows_mode() {
        let mut config = AppConfig::for_tests();
        assert_eq!(config.paypal_base_url(), "https://api.sandbox.paypal.com");

        config.paypal_mode = "live".to_string();
        assert_eq!(config.paypal_base_url(), "https://api.paypal.com");
    }

    #[test]
    fn test_try_load_falls_back_on_unparseable_value() {
        env::set_var("TRIP_PLANNER_TEST_PORT", "not-a-number");
        let port: u16 = try_load("TRIP_PLANNER_TEST_PORT", 4242);
        assert_eq!(port, 4242);
        env::remove_var("TRIP_PLANNER_TEST_PORT");
    }
}

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web, Error, HttpResponse, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::warn;
use serde_json::json;

use crate::middleware::auth::{bearer_token, verify_token};
use crate::state::AppState;

#[derive(Debug)]
pub struct TooManyRequests {
    pub retry_after: u64,
}

impl std::fmt::Display for TooManyRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Too many requests, retry after {}s", self.retry_after)
    }
}

impl ResponseError for TooManyRequests {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .insert_header(("Retry-After", self.retry_after.to_string()))
            .json(json!({
                "error": "Too many requests",
                "retryAfter": self.retry_after,
            }))
    }
}

/// Fixed-window request counter keyed by caller.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request for `key`. Returns the seconds until the window
    /// resets when the caller is over the limit.
    pub fn check(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if entry.1 >= self.max_requests {
            let elapsed = now.duration_since(entry.0);
            let remaining = self.window.saturating_sub(elapsed);
            return Err(remaining.as_secs().max(1));
        }

        entry.1 += 1;
        Ok(())
    }
}

pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(max_requests, window)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_key(&req);

        if let Err(retry_after) = self.limiter.check(&key, Instant::now()) {
            warn!("Rate limit exceeded for {}", key);
            return Box::pin(ready(Err(TooManyRequests { retry_after }.into())));
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

fn client_key(req: &ServiceRequest) -> String {
    let user = req
        .app_data::<web::Data<AppState>>()
        .zip(bearer_token(req.request()))
        .and_then(|(state, token)| verify_token(&state.config.jwt_secret, token).ok());

    match user {
        Some(claims) => format!("user:{}", claims.user_id),
        None => format!(
            "ip:{}",
            req.connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_after_max_requests() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check("ip:1", now).is_ok());
        assert!(limiter.check("ip:1", now).is_ok());
        let retry = limiter.check("ip:1", now).unwrap_err();
        assert_eq!(retry, 60);

        // other callers have their own window
        assert!(limiter.check("ip:2", now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check("user:a", start).is_ok());
        assert!(limiter.check("user:a", start + Duration::from_secs(5)).is_err());
        assert!(limiter
            .check("user:a", start + Duration::from_secs(11))
            .is_ok());
    }
}

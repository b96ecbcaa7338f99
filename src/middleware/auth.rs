use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use chrono::{Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, PartialEq)]
pub enum TokenError {
    Expired,
    Invalid,
}

pub fn generate_token(
    secret: &str,
    expiry_hours: i64,
    user_id: &str,
    email: &str,
    name: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        exp: (now + Duration::hours(expiry_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
        user_id: user_id.to_string(),
        name: name.to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sub", "user_id"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => {
            debug!("Error decoding token: {:?}", err);
            TokenError::Invalid
        }
    })
}

pub fn bearer_token(req: &actix_web::HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let secret = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.config.jwt_secret.clone(),
            None => {
                return Box::pin(ready(Err(ApiError::Internal(
                    "Application state not configured".to_string(),
                )
                .into())))
            }
        };

        let token = match bearer_token(req.request()) {
            Some(token) => token.to_string(),
            None => {
                return Box::pin(ready(Err(ApiError::Unauthorized(
                    "Access token required".to_string(),
                )
                .into())))
            }
        };

        match verify_token(&secret, &token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(TokenError::Expired) => Box::pin(ready(Err(ApiError::Unauthorized(
                "Token expired".to_string(),
            )
            .into()))),
            Err(TokenError::Invalid) => Box::pin(ready(Err(ApiError::Unauthorized(
                "Invalid token".to_string(),
            )
            .into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = generate_token("secret", 1, "user-1", "a@example.com", "Asha").unwrap();
        let claims = verify_token("secret", &token).unwrap();

        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.sub, "a@example.com");
        assert_eq!(claims.name, "Asha");
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = generate_token("secret", 1, "user-1", "a@example.com", "").unwrap();
        assert_eq!(verify_token("other", &token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_expired_token() {
        let token = generate_token("secret", -2, "user-1", "a@example.com", "").unwrap();
        assert_eq!(verify_token("secret", &token).unwrap_err(), TokenError::Expired);
    }
}

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, Error, FromRequest, HttpMessage, HttpRequest};

use crate::error::ApiError;
use crate::middleware::auth::{bearer_token, verify_token, Claims};
use crate::state::AppState;

pub const DEMO_USER_ID: &str = "demo-user";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        AuthenticatedUser {
            user_id: claims.user_id.clone(),
            email: claims.sub.clone(),
            name: claims.name.clone(),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            ready(Ok(AuthenticatedUser::from(claims)))
        } else {
            ready(Err(
                ApiError::Unauthorized("User not authenticated".to_string()).into()
            ))
        }
    }
}

/// Caller identity on routes where signing in is optional. A missing or bad
/// token yields an anonymous caller instead of an error.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    pub fn user_id_or_demo(&self) -> String {
        self.0
            .as_ref()
            .map(|u| u.user_id.clone())
            .unwrap_or_else(|| DEMO_USER_ID.to_string())
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            return ready(Ok(MaybeUser(Some(AuthenticatedUser::from(claims)))));
        }

        let user = match (req.app_data::<web::Data<AppState>>(), bearer_token(req)) {
            (Some(state), Some(token)) => verify_token(&state.config.jwt_secret, token)
                .ok()
                .map(|claims| AuthenticatedUser::from(&claims)),
            _ => None,
        };

        ready(Ok(MaybeUser(user)))
    }
}

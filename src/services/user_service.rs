use chrono::Utc;
use log::{info, warn};
use mongodb::{bson::doc, Collection, Database};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::mongo::USERS;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::generate_token;
use crate::models::user::{
    LoginRequest, ProfileUpdate, RegisterRequest, User, UserProfile,
};

const MIN_PASSWORD_LENGTH: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
        })
        .is_match(email)
}

pub fn validate_registration(request: &RegisterRequest) -> ApiResult<()> {
    if !is_valid_email(request.email.trim()) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Token plus the profile it was issued for.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct UserService {
    users: Collection<User>,
    jwt_secret: String,
    jwt_expiry_hours: i64,
}

impl UserService {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        Self {
            users: db.collection(USERS),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_hours: config.jwt_expiry_hours,
        }
    }

    fn session_for(&self, user: User) -> ApiResult<Session> {
        let token = generate_token(
            &self.jwt_secret,
            self.jwt_expiry_hours,
            &user.id,
            &user.email,
            user.name.as_deref().unwrap_or_default(),
        )?;
        Ok(Session {
            token,
            user: user.into(),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> ApiResult<Session> {
        validate_registration(&request)?;
        let email = request.email.trim().to_lowercase();

        if self.users.find_one(doc! { "email": &email }).await?.is_some() {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password: bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?,
            name: request.name,
            phone: request.phone,
            preferences: serde_json::json!({}),
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.users.insert_one(&user).await?;
        info!("Registered user {}", user.id);
        self.session_for(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ApiResult<Session> {
        let email = request.email.trim().to_lowercase();
        let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

        let user = self
            .users
            .find_one(doc! { "email": &email })
            .await?
            .ok_or_else(invalid)?;

        if !bcrypt::verify(&request.password, &user.password).unwrap_or(false) {
            warn!("Failed sign-in for user {}", user.id);
            return Err(invalid());
        }

        self.session_for(user)
    }

    pub async fn profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.users
            .find_one(doc! { "_id": user_id })
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> ApiResult<UserProfile> {
        let mut set = doc! { "updatedAt": bson::to_bson(&Utc::now())? };
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(phone) = update.phone {
            set.insert("phone", phone);
        }
        if let Some(preferences) = update.preferences {
            set.insert("preferences", bson::to_bson(&preferences)?);
        }

        let result = self
            .users
            .update_one(doc! { "_id": user_id }, doc! { "$set": set })
            .await?;
        if result.matched_count == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        self.profile(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: None,
            phone: None,
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+trips@mail.co.in"));
        assert!(!is_valid_email("asha@"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn test_registration_rules() {
        assert!(validate_registration(&register("asha@example.com", "secret1")).is_ok());
        assert!(matches!(
            validate_registration(&register("asha@example.com", "123")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_registration(&register("asha", "secret1")),
            Err(ApiError::BadRequest(_))
        ));
    }
}

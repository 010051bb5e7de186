/// Authentication endpoints
///
/// - `POST /api/auth/register` - Register a new user (`ROLE_USER`)
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use carbooking_shared::{
    auth::{jwt, password},
    models::{
        role::Role,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked again for strength after basic validation
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Trims surrounding whitespace so length rules apply to the stored value
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,

    pub token_type: &'static str,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
///
/// { "username": "alice", "email": "alice@example.com", "password": "secret1" }
/// ```
///
/// Returns `201 Created` with an access/refresh token pair.
///
/// # Errors
///
/// - `409 Conflict`: Username or email already taken
/// - `422 Unprocessable Entity`: Validation failed or password too weak
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<jwt::TokenPair>)> {
    let req = req.normalized();
    req.validate()?;
    password::validate_password_strength(&req.password)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            roles: vec![Role::User],
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let tokens = jwt::issue_token_pair(user.id, &user.username, vec![Role::User], state.jwt_secret())?;

    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login endpoint
///
/// ```text
/// POST /api/auth/login
///
/// { "username": "john", "password": "user123" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<jwt::TokenPair>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, req.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "Failed login attempt");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let roles = Role::list_for_user(&state.db, user.id).await?;
    User::update_last_login(&state.db, user.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let tokens = jwt::issue_token_pair(user.id, &user.username, roles, state.jwt_secret())?;

    Ok(Json(tokens))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_register_request_is_trimmed_before_validation() {
        let req = RegisterRequest {
            username: "  x  ".to_string(),
            email: " Alice@Example.com ".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();

        assert_eq!(req.username, "x");
        assert_eq!(req.email, "alice@example.com");
        assert!(req.validate().unwrap_err().field_errors().contains_key("username"));

        let blank = RegisterRequest {
            username: "     ".to_string(),
            email: "blank@example.com".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_login_request_requires_fields() {
        let req = LoginRequest {
            username: String::new(),
            password: String::new(),
        };
        assert_eq!(req.validate().unwrap_err().field_errors().len(), 2);
    }
}

/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/registration` - Register a new account
/// - `POST /api/login` - Authenticate and get a token
///
/// Both return the same shape: a bearer token plus the user's id, email and
/// display name. All failures are field-scoped 400s so clients can highlight
/// the offending input.

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use kanmind_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation; must equal `password`
    pub repeated_password: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Fullname must be 1-100 characters"))]
    pub fullname: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response for both registration and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,

    /// Display name
    pub fullname: String,

    /// Email address
    pub email: String,

    /// User ID
    pub user_id: Uuid,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/registration
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "hunter2hunter2",
///   "repeated_password": "hunter2hunter2",
///   "fullname": "Jane Doe"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed email, short password, password mismatch,
///   or the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(validation_details)?;

    if req.password != req.repeated_password {
        return Err(ApiError::validation("password", "Passwords do not match."));
    }

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::validation("email", "Email already in use."));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            full_name: req.fullname,
            password_hash,
        },
    )
    .await?;

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "New user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            fullname: user.full_name,
            email: user.email,
            user_id: user.id,
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "hunter2hunter2"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown email or wrong password, reported against
///   the respective field
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_details)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::validation("email", "Invalid email."))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::validation("password", "Invalid password."));
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(AuthResponse {
        token,
        fullname: user.full_name,
        email: user.email,
        user_id: user.id,
    }))
}

/// Request authentication context
///
/// The API server validates the bearer token in a middleware layer and puts
/// an [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and pass the identity explicitly into every
/// store and authorization call; there is no ambient current user.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use kanmind_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Authenticated identity attached to a request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

/// Error type for credential extraction
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header present
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header is present but not a Bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),
}

/// Extracts the bearer token from a request's headers
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` when the Authorization header is
/// absent, `AuthError::InvalidFormat` when it is not a `Bearer` value.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

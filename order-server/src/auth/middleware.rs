//! Authentication middleware and the current-user identity

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use crate::auth::jwt::JwtService;
use crate::db;
use crate::state::AppState;

/// Authenticated user identity, injected into request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub admin: bool,
}

impl CurrentUser {
    /// Whether this user carries the admin flag
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Owner-or-admin policy: admins may act on any user's resources,
    /// everyone else only on their own.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.admin || self.id == owner_id
    }
}

impl From<db::users::User> for CurrentUser {
    fn from(user: db::users::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            active: user.active,
            admin: user.admin,
        }
    }
}

/// Middleware that extracts and verifies the bearer token from the
/// Authorization header, resolves the subject against the user store and
/// injects [`CurrentUser`] into the request.
///
/// Signature failure, expiry, a malformed subject and an unknown user are all
/// surfaced uniformly as 401 "Invalid or expired token"; the actual cause is
/// only logged.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized)?;

    let token = JwtService::extract_from_header(auth_header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = state.jwt.validate_token(token).map_err(|e| {
        tracing::debug!("token validation failed: {e}");
        AppError::invalid_token("Invalid or expired token")
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| {
        tracing::debug!("token subject is not a user id: {}", claims.sub);
        AppError::invalid_token("Invalid or expired token")
    })?;

    let user = db::users::find_by_id(&state.pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error resolving token subject: {e}");
            AppError::internal("Internal server error")
        })?
        .ok_or_else(|| AppError::invalid_token("Invalid or expired token"))?;

    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

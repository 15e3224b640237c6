//! Authentication endpoints: signup, signin, token refresh, admin creation

use axum::extract::State;
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::auth::jwt::JwtError;
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

use super::{ApiResult, internal};

// ── Request / Response types ──

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2-style form body; `username` carries the email
#[derive(Deserialize)]
pub struct SigninForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SigninResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

// ── Validation helpers ──

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Password policy: at least 8 characters, one letter and one digit
fn is_valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

// ── Helpers ──

/// Verify a credential pair against the user store.
///
/// An unknown email and a wrong password are indistinguishable to the caller.
/// A stored hash that fails to parse is a data-integrity fault, not a
/// credential failure.
async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<db::users::User, AppError> {
    let user = db::users::find_by_email(&state.pool, email)
        .await
        .map_err(internal)?
        .ok_or_else(AppError::invalid_credentials)?;

    let ok = verify_password(password, &user.password).map_err(|e| {
        tracing::error!(user_id = user.id, "stored password hash is malformed: {e}");
        AppError::internal("Internal server error")
    })?;
    if !ok {
        return Err(AppError::invalid_credentials());
    }

    Ok(user)
}

fn to_token(result: Result<String, JwtError>) -> Result<String, AppError> {
    result.map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::internal("Internal server error")
    })
}

/// Validate a signup payload and insert the user. Shared by the public signup
/// and the admin-creation endpoint; only the admin flag differs.
async fn create_user(state: &AppState, req: &SignupRequest, admin: bool) -> Result<i64, AppError> {
    let email = req.email.trim();

    if !is_valid_email(email) {
        return Err(AppError::new(ErrorCode::InvalidEmail));
    }
    if !is_valid_password(&req.password) {
        return Err(AppError::new(ErrorCode::WeakPassword));
    }

    if db::users::find_by_email(&state.pool, email)
        .await
        .map_err(internal)?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::EmailTaken));
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("password hash error: {e}");
        AppError::internal("Internal server error")
    })?;

    db::users::create(
        &state.pool,
        req.name.trim(),
        email,
        &hashed,
        req.active,
        admin,
        now_millis(),
    )
    .await
    .map_err(internal)
}

// ── Handlers ──

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<serde_json::Value> {
    // Public signup never grants the admin flag
    create_user(&state, &req, false).await?;

    Ok(Json(serde_json::json!({
        "message": "User created successfully"
    })))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<SigninResponse> {
    let user = authenticate(&state, req.email.trim(), &req.password).await?;

    let access_token = to_token(state.jwt.issue_access_token(user.id))?;
    let refresh_token = to_token(state.jwt.issue_refresh_token(user.id))?;

    Ok(Json(SigninResponse {
        access_token,
        refresh_token,
        token_type: "Bearer",
    }))
}

/// POST /auth/signin-test — form-encoded variant used by OAuth2 tooling
pub async fn signin_test(
    State(state): State<AppState>,
    Form(form): Form<SigninForm>,
) -> ApiResult<AccessTokenResponse> {
    let user = authenticate(&state, form.username.trim(), &form.password).await?;

    let access_token = to_token(state.jwt.issue_access_token(user.id))?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "Bearer",
    }))
}

/// POST /auth/refresh
///
/// Exchanges any valid bearer token for a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<AccessTokenResponse> {
    let access_token = to_token(state.jwt.issue_access_token(user.id))?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "Bearer",
    }))
}

/// POST /auth/create-admin — admin-only
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<serde_json::Value> {
    if !current.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    create_user(&state, &req, true).await?;

    Ok(Json(serde_json::json!({
        "message": "Admin user created successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@"));
        assert!(!is_valid_email("john@nodot"));
        assert!(!is_valid_email("john@.com"));
        assert!(!is_valid_email("john doe@example.com"));
    }

    #[test]
    fn test_password_policy() {
        assert!(is_valid_password("abc12345"));
        assert!(is_valid_password("x1x1x1x1"));

        // No digit
        assert!(!is_valid_password("abcdefgh"));
        // No letter
        assert!(!is_valid_password("12345678"));
        // Too short
        assert!(!is_valid_password("abc1234"));
    }
}

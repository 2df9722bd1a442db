//! Handlers for the `/users` resource (sign-up, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use onboard_core::account::{normalize_email, Account, NewAccount};
use onboard_core::error::CoreError;
use onboard_core::types::DbId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity issued on sign-up and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: DbId,
    pub email: String,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/users
///
/// Create an account and return a token for it.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let input = SignupRequest {
        email: normalize_email(&input.email),
        password: input.password,
    };
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    validate_password_strength(&input.password, state.config.password_min_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let account = state
        .accounts
        .create(&NewAccount {
            email: input.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = account.id, "Account created");

    Ok((StatusCode::CREATED, Json(auth_response(&state, &account)?)))
}

/// POST /api/users/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let account = state
        .accounts
        .find_by_email(&normalize_email(&input.email))
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = account.id, "Login rejected");
        return Err(invalid_credentials());
    }

    tracing::info!(user_id = account.id, "Login succeeded");

    Ok(Json(auth_response(&state, &account)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    ))
}

fn auth_response(state: &AppState, account: &Account) -> AppResult<AuthResponse> {
    let token = generate_access_token(account.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        id: account.id,
        email: account.email.clone(),
        token,
    })
}

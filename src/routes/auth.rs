use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AppState;
use crate::auth::{generate_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::store::UserAccount;

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 3, max = 50, message = "Must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Must be 8 to 128 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

fn issue(state: &AppState, username: String) -> ApiResult<TokenResponse> {
    let access_token = generate_token(&state.config.jwt, username).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign access token");
        ApiError::InternalError(e.to_string())
    })?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
    })
}

/// POST /api/auth/register
#[tracing::instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    payload.validate()?;
    let username = payload.username.trim().to_string();

    let password_hash = hash_password(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        ApiError::InternalError(e.to_string())
    })?;

    state
        .data
        .update_accounts(|accounts| -> ApiResult<()> {
            if accounts
                .iter()
                .any(|account| account.username.eq_ignore_ascii_case(&username))
            {
                return Err(ApiError::Conflict("Username already registered".to_string()));
            }
            accounts.push(UserAccount {
                username: username.clone(),
                password_hash,
            });
            Ok(())
        })
        .await?;

    tracing::info!("Registered account");
    Ok((StatusCode::CREATED, Json(issue(&state, username)?)))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> ApiResult<Json<TokenResponse>> {
    let username = payload.username.trim();
    let account = state
        .data
        .accounts()?
        .into_iter()
        .find(|account| account.username.eq_ignore_ascii_case(username));

    match account {
        Some(account) if verify_password(&payload.password, &account.password_hash) => {
            Ok(Json(issue(&state, account.username)?))
        }
        _ => {
            tracing::warn!("Failed login attempt");
            Err(ApiError::Unauthorized(
                "Incorrect username or password".to_string(),
            ))
        }
    }
}

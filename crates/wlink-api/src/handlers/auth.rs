//! Authentication handlers: registration, login, OTP, social login.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use wlink_models::{SocialProvider, User};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Map validator failures into the shared taxonomy.
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> ApiResult<()> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// Account shape returned to clients (no credential material).
#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<String>,
}

impl From<&User> for AccountResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_type: user
                .profile
                .as_ref()
                .map(|p| p.profile_type.as_str().to_string()),
        }
    }
}

/// Signed bearer token plus the account it belongs to.
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: AccountResponse,
}

fn token_response(state: &AppState, user: &User) -> ApiResult<Json<TokenResponse>> {
    let token = state.auth.issue_token(user)?;
    Ok(Json(TokenResponse {
        token,
        user: AccountResponse::from(user),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Register a credential-based account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_payload(&request)?;
    let user = state
        .accounts
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            request.last_name,
        )
        .await?;
    token_response(&state, &user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Log in with credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_payload(&request)?;
    let user = state.accounts.login(&request.email, &request.password).await?;
    token_response(&state, &user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Issue an email verification code.
pub async fn send_email_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> ApiResult<Json<StatusResponse>> {
    validate_payload(&request)?;
    state.accounts.send_email_otp(&request.email).await?;
    Ok(Json(StatusResponse {
        status: "sent".to_string(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "code must be 6 digits"))]
    pub code: String,
}

/// Verify a submitted code.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> ApiResult<Json<StatusResponse>> {
    validate_payload(&request)?;
    state.accounts.verify_otp(&request.email, &request.code).await?;
    Ok(Json(StatusResponse {
        status: "verified".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SocialAuthRequest {
    pub provider: String,
    pub code: String,
    #[serde(default)]
    pub redirect_uri: String,
}

/// Exchange a provider authorization code for a bearer token.
pub async fn social_auth(
    State(state): State<AppState>,
    Json(request): Json<SocialAuthRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let provider = SocialProvider::parse(&request.provider)
        .ok_or_else(|| ApiError::validation(format!("Unknown provider '{}'", request.provider)))?;

    let profile = state
        .oauth
        .exchange_code(provider, &request.code, &request.redirect_uri)
        .await?;
    let user = state.accounts.social_auth(provider, profile).await?;
    token_response(&state, &user)
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    #[serde(default)]
    pub redirect_uri: String,
}

/// Per-provider OAuth callback route producing a signed bearer token.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> ApiResult<Json<TokenResponse>> {
    let provider = SocialProvider::parse(&provider)
        .ok_or_else(|| ApiError::not_found(format!("Unknown provider '{}'", provider)))?;

    let profile = state
        .oauth
        .exchange_code(provider, &query.code, &query.redirect_uri)
        .await?;
    let user = state.accounts.social_auth(provider, profile).await?;
    token_response(&state, &user)
}

/// Delete the caller's account and its role profile.
pub async fn delete_account(
    State(state): State<AppState>,
    user: crate::auth::AuthUser,
) -> ApiResult<Json<StatusResponse>> {
    state.accounts.delete_account(&user.id).await?;
    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}

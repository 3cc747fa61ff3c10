use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::credential::CredentialError;
use common::owner::{validate_password, validate_username, CredentialPolicyError};

use super::message;
use crate::database::is_unique_violation;
use crate::database::models::Owner;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::password::{self, PasswordError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SignupRequest {
    /// Username to register (3-20 characters)
    #[arg(long)]
    #[serde(default)]
    pub username: String,
    /// Password (at least 8 characters, mixed case, a digit and a symbol)
    #[arg(long)]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct LoginRequest {
    #[arg(long)]
    #[serde(default)]
    pub username: String,
    #[arg(long)]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn signup_handler(
    State(state): State<ServiceState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let username = req.username.trim().to_string();
    validate_username(&username)?;
    validate_password(&req.password)?;

    let hash = password::hash_password(req.password).await?;
    let owner = match Owner::create(&username, &hash, state.database()).await {
        Ok(owner) => owner,
        Err(e) if is_unique_violation(&e) => return Err(AuthError::UsernameTaken),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(owner = %owner.id, %username, "owner signed up");
    Ok(Json(SignupResponse {
        message: "user signed up successfully on the app".to_string(),
    }))
}

pub async fn login_handler(
    State(state): State<ServiceState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let owner = Owner::by_username(req.username.trim(), state.database())
        .await?
        .ok_or(AuthError::InvalidLogin)?;

    if !password::verify_password(req.password, owner.password_hash.clone()).await? {
        tracing::debug!(owner = %owner.id, "wrong password");
        return Err(AuthError::InvalidLogin);
    }

    let token = state.credentials().issue(owner.owner_id())?;
    tracing::info!(owner = %owner.id, "owner logged in");
    Ok(Json(LoginResponse { token }))
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Policy(#[from] CredentialPolicyError),
    #[error("please enter a unique username")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidLogin,
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Policy(_) | AuthError::UsernameTaken | AuthError::InvalidLogin => {
                message(StatusCode::BAD_REQUEST, self.to_string())
            }
            AuthError::Password(_) | AuthError::Credential(_) | AuthError::Database(_) => {
                tracing::error!(error = %self, "account request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}

impl ApiRequest for SignupRequest {
    type Response = SignupResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/signup")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/login")?;
        Ok(client.post(full_url).json(&self))
    }
}

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::access::AccessError;
use common::owner::OwnerId;
use common::share::{ShareLinkError, ShareLinkProvider, ShareToken};

use super::message;
use crate::database::models::{ContentItem, Owner};
use crate::http_server::access::{Access, AccessRejection};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ShareRequest {
    /// Publish (true) or withdraw (false) the share link
    #[arg(long, action = clap::ArgAction::Set)]
    pub share: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub message: String,
    /// The share token, present when sharing was enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleValueResponse {
    pub is_brain_shared: bool,
    pub public_edit_allowed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleEditRequest {
    pub toggle_value: bool,
}

/// The caller's own account. These routes never take a share link, so the
///  resolved scope is the authenticated owner.
async fn calling_owner(access: &Access, state: &ServiceState) -> Result<Owner, BrainError> {
    let owner_id: OwnerId = access
        .0
        .authenticated_id()
        .ok_or(AccessError::AuthorizationRequired)?;
    Owner::get(owner_id, state.database())
        .await?
        .ok_or(BrainError::UnknownOwner)
}

pub async fn share_handler(
    State(state): State<ServiceState>,
    access: Access,
    Json(req): Json<ShareRequest>,
) -> Result<impl IntoResponse, BrainError> {
    let owner = calling_owner(&access, &state).await?;

    let response = if req.share {
        let token = state.database().enable_sharing(owner.owner_id()).await?;
        ShareResponse {
            message: "Share link created".to_string(),
            link: Some(token.to_string()),
        }
    } else {
        state.database().disable_sharing(owner.owner_id()).await?;
        ShareResponse {
            message: "hash Deleted successfully".to_string(),
            link: None,
        }
    };

    Ok(Json(response))
}

/// Public, read-only view of a shared collection.
pub async fn shared_view_handler(
    State(state): State<ServiceState>,
    Path(share_link): Path<String>,
) -> Result<impl IntoResponse, BrainError> {
    let token = ShareToken::parse(&share_link).map_err(|_| BrainError::LinkNotFound)?;
    let resolved = state
        .database()
        .resolve(&token)
        .await?
        .filter(|link| link.flags.sharing_enabled)
        .ok_or(BrainError::LinkNotFound)?;

    let owner = Owner::get(resolved.owner_id, state.database())
        .await?
        .ok_or(BrainError::LinkNotFound)?;
    let content = ContentItem::list(resolved.owner_id, state.database()).await?;

    Ok(Json(serde_json::json!({
        "username": owner.username,
        "content": content,
    })))
}

pub async fn toggle_value_handler(
    State(state): State<ServiceState>,
    access: Access,
) -> Result<impl IntoResponse, BrainError> {
    let owner = calling_owner(&access, &state).await?;
    Ok(Json(ToggleValueResponse {
        is_brain_shared: owner.sharing_enabled,
        public_edit_allowed: owner.public_edit_allowed,
    }))
}

pub async fn toggle_edit_handler(
    State(state): State<ServiceState>,
    access: Access,
    Json(req): Json<ToggleEditRequest>,
) -> Result<impl IntoResponse, BrainError> {
    let owner_id = access
        .0
        .authenticated_id()
        .ok_or(AccessError::AuthorizationRequired)?;

    if !Owner::set_public_edit(owner_id, req.toggle_value, state.database()).await? {
        return Err(BrainError::NotShared);
    }

    tracing::info!(owner = %owner_id, public_edit = req.toggle_value, "public edit toggled");
    let msg = if req.toggle_value {
        "Brain is editable now"
    } else {
        "Brain is viewable only now"
    };
    Ok(message(StatusCode::OK, msg))
}

#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("User does not exists, Invalid token")]
    UnknownOwner,
    #[error("This Link does not exists")]
    LinkNotFound,
    #[error("Either the brain is not shared or the user is not authorized")]
    NotShared,
    #[error("Share link conflict, please retry")]
    ShareLinkConflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ShareLinkError<sqlx::Error>> for BrainError {
    fn from(err: ShareLinkError<sqlx::Error>) -> Self {
        match err {
            ShareLinkError::Provider(e) => BrainError::Database(e),
            ShareLinkError::Conflict => BrainError::ShareLinkConflict,
        }
    }
}

impl IntoResponse for BrainError {
    fn into_response(self) -> Response {
        match self {
            BrainError::Access(e) => AccessRejection(e).into_response(),
            BrainError::UnknownOwner | BrainError::NotShared => {
                message(StatusCode::BAD_REQUEST, self.to_string())
            }
            BrainError::LinkNotFound => message(StatusCode::NOT_FOUND, self.to_string()),
            BrainError::ShareLinkConflict => message(StatusCode::CONFLICT, self.to_string()),
            BrainError::Database(_) => {
                tracing::error!(error = %self, "brain request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}

impl ApiRequest for ShareRequest {
    type Response = ShareResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/brain/share")?;
        Ok(client.post(full_url).json(&self))
    }
}

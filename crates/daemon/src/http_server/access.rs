use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::request::Parts;

use common::access::{resolve_access, AccessError, EffectiveAccess};
use common::credential::CredentialError;

use crate::ServiceState;

/// Path parameter carrying a share token on `/shared/:shared_brain_link/...`.
pub const SHARE_LINK_PARAM: &str = "shared_brain_link";

/// The resolved identity of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Access(pub EffectiveAccess);

#[async_trait]
impl FromRequestParts<ServiceState> for Access {
    type Rejection = AccessRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        let share_token = params.get(SHARE_LINK_PARAM).map(String::as_str);

        // an empty header is the same as no header, an unreadable one is a bad credential
        let credential = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|v| {
                v.to_str().map_err(|e| {
                    AccessError::InvalidCredential(CredentialError::Invalid(e.to_string()))
                })
            })
            .transpose()?
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let access = resolve_access(
            state.database(),
            state.credentials(),
            share_token,
            credential,
        )
        .await?;

        tracing::debug!(
            scope = %access.scope_owner_id(),
            shared = access.is_share_link_access(),
            can_edit = access.can_edit(),
            "resolved request access"
        );
        Ok(Access(access))
    }
}

/// HTTP face of [`AccessError`].
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AccessRejection(#[from] pub AccessError);

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AccessError::InvalidShareLink => {
                (StatusCode::BAD_REQUEST, "Invalid Shared Link".to_string())
            }
            AccessError::AuthorizationRequired => (
                StatusCode::BAD_REQUEST,
                "Authorization is required".to_string(),
            ),
            AccessError::InvalidCredential(e) => (
                StatusCode::BAD_REQUEST,
                format!("Error occured while validating the user: {}", e),
            ),
            AccessError::ViewOnly => (
                StatusCode::BAD_REQUEST,
                "This content can only be viewed".to_string(),
            ),
            AccessError::Lookup(e) => {
                tracing::error!(error = %e, "share link lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

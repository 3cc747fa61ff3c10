use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use common::access::AccessError;
use common::content::ContentTypeError;

use super::{message, parse_content_id, ContentPath};
use crate::database::models::{ContentItem, ContentPatch, NewContent};
use crate::http_server::access::{Access, AccessRejection};
use crate::ServiceState;

/// Body of a content create. Every field is required; they are optional
///  here so a missing one gets a readable error instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentRequest {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of a content update. Absent fields keep their current value;
///  `tags` replaces the whole set when given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentRequest {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn list_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
) -> Result<impl IntoResponse, ContentError> {
    let items = ContentItem::list(access.scope_owner_id(), state.database()).await?;
    Ok(Json(serde_json::json!({ "userContentData": items })))
}

pub async fn create_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Json(req): Json<CreateContentRequest>,
) -> Result<impl IntoResponse, ContentError> {
    access.ensure_can_edit()?;

    let (Some(kind), Some(link), Some(title)) = (
        non_empty(req.content_type),
        non_empty(req.link),
        non_empty(req.title),
    ) else {
        return Err(ContentError::MissingFields);
    };
    let content_type = state.content_types().parse(&kind)?;

    let new = NewContent {
        content_type,
        link,
        title,
        tags: req.tags.unwrap_or_default(),
        media_key: None,
    };
    let item = ContentItem::create(
        access.scope_owner_id(),
        &new,
        access.attribution(),
        state.database(),
    )
    .await?;

    tracing::info!(
        content = %item.id,
        scope = %access.scope_owner_id(),
        added_by = %item.added_by,
        "content created"
    );
    Ok(Json(serde_json::json!({
        "message": "Content created successfully",
        "content": item,
    })))
}

pub async fn update_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Path(path): Path<ContentPath>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<impl IntoResponse, ContentError> {
    access.ensure_can_edit()?;

    let content_type = match non_empty(req.content_type) {
        Some(kind) => Some(state.content_types().parse(&kind)?),
        None => None,
    };
    let patch = ContentPatch {
        content_type,
        link: non_empty(req.link),
        title: non_empty(req.title),
        tags: req.tags,
        media_key: None,
    };

    let id = parse_content_id(&path.content_id).ok_or(ContentError::NotAuthorizedToModify)?;
    let item = ContentItem::update(
        id,
        access.scope_owner_id(),
        &patch,
        access.attribution(),
        state.database(),
    )
    .await?
    .ok_or(ContentError::NotAuthorizedToModify)?;

    tracing::info!(content = %item.id, scope = %access.scope_owner_id(), "content updated");
    Ok(Json(serde_json::json!({
        "message": "Content updated successfully",
        "content": item,
    })))
}

pub async fn delete_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Path(path): Path<ContentPath>,
) -> Result<impl IntoResponse, ContentError> {
    access.ensure_can_edit()?;

    let id = parse_content_id(&path.content_id).ok_or(ContentError::NotAuthorizedToDelete)?;
    let deleted = ContentItem::delete(id, access.scope_owner_id(), state.database())
        .await?
        .ok_or(ContentError::NotAuthorizedToDelete)?;

    if let Some(key) = deleted.media_key {
        // the row is gone either way; an orphaned object is only logged
        if let Err(e) = state.media().delete(&key).await {
            tracing::warn!(%key, error = %e, "failed to delete media for removed content");
        }
    }

    tracing::info!(content = %id, scope = %access.scope_owner_id(), "content deleted");
    Ok(message(StatusCode::OK, "Content deleted successfully"))
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("enter all the field to create a content")]
    MissingFields,
    #[error("{0}")]
    ContentType(#[from] ContentTypeError),
    #[error("You are not authorized to modify the data")]
    NotAuthorizedToModify,
    #[error("You are not authorized to delete the data")]
    NotAuthorizedToDelete,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        match self {
            ContentError::Access(e) => AccessRejection(e).into_response(),
            ContentError::MissingFields
            | ContentError::ContentType(_)
            | ContentError::NotAuthorizedToModify
            | ContentError::NotAuthorizedToDelete => {
                message(StatusCode::BAD_REQUEST, self.to_string())
            }
            ContentError::Database(_) => {
                tracing::error!(error = %self, "content request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}

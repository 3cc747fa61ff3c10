use axum::extract::multipart::MultipartError;
use axum::extract::{Json, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use common::access::AccessError;
use common::content::{ContentType, ContentTypeError};

use super::{message, parse_content_id, ContentPath};
use crate::database::models::{ContentItem, ContentPatch, NewContent};
use crate::http_server::access::{Access, AccessRejection};
use crate::media::MediaStoreError;
use crate::ServiceState;

const FILE_FIELD: &str = "uploadImage";

struct UploadedFile {
    name: String,
    mime: Option<String>,
    data: Bytes,
}

/// The fields of an upload form. Repeated `tags` fields accumulate, and a
///  single field may carry several comma separated tags.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    content_type: Option<String>,
    tags: Option<Vec<String>>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let mime = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    if !data.is_empty() {
                        form.file = Some(UploadedFile {
                            name: file_name,
                            mime,
                            data,
                        });
                    }
                }
                "title" => form.title = non_empty(field.text().await?),
                "type" => form.content_type = non_empty(field.text().await?),
                "tags" => {
                    let text = field.text().await?;
                    form.tags
                        .get_or_insert_with(Vec::new)
                        .extend(text.split(',').map(|t| t.trim().to_string()));
                }
                _ => tracing::debug!(field = %name, "ignoring unknown upload field"),
            }
        }

        Ok(form)
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Pick a content kind for an upload that did not name one.
fn infer_content_type(file: &UploadedFile) -> ContentType {
    let mime = file
        .mime
        .clone()
        .unwrap_or_else(|| mime_guess::from_path(&file.name).first_or_octet_stream().to_string());

    if mime.starts_with("image/") {
        ContentType::Images
    } else if mime.starts_with("video/") {
        ContentType::Videos
    } else {
        ContentType::Documents
    }
}

fn resolve_content_type(
    state: &ServiceState,
    named: Option<&str>,
    file: &UploadedFile,
) -> Result<ContentType, ContentTypeError> {
    match named {
        Some(kind) => state.content_types().parse(kind),
        None => Ok(infer_content_type(file)),
    }
}

pub async fn upload_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    access.ensure_can_edit()?;

    let form = UploadForm::read(multipart).await?;
    let file = form.file.ok_or(UploadError::NoFile)?;
    let content_type = resolve_content_type(&state, form.content_type.as_deref(), &file)?;

    let stored = state.media().put(&file.name, file.data).await?;
    let new = NewContent {
        content_type,
        link: stored.url.to_string(),
        title: form.title.unwrap_or_else(|| file.name.clone()),
        tags: form.tags.unwrap_or_default(),
        media_key: Some(stored.key.clone()),
    };

    let created = ContentItem::create(
        access.scope_owner_id(),
        &new,
        access.attribution(),
        state.database(),
    )
    .await;
    let item = match created {
        Ok(item) => item,
        Err(e) => {
            // don't leave an unreferenced object behind
            if let Err(cleanup) = state.media().delete(&stored.key).await {
                tracing::warn!(key = %stored.key, error = %cleanup, "failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        content = %item.id,
        key = %stored.key,
        scope = %access.scope_owner_id(),
        "file uploaded"
    );
    Ok(Json(serde_json::json!({
        "message": "File uploaded successfully",
        "content": item,
    })))
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Path(path): Path<ContentPath>,
) -> Result<impl IntoResponse, UploadError> {
    let id = parse_content_id(&path.content_id).ok_or(UploadError::NotFound)?;
    let item = ContentItem::get(id, access.scope_owner_id(), state.database())
        .await?
        .ok_or(UploadError::NotFound)?;

    Ok(Json(serde_json::json!({
        "message": format!("You can view your file here {}", item.link),
        "content": item,
    })))
}

pub async fn replace_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Path(path): Path<ContentPath>,
    multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    access.ensure_can_edit()?;

    let form = UploadForm::read(multipart).await?;
    let file = form.file.ok_or(UploadError::NoNewFile)?;

    let id = parse_content_id(&path.content_id).ok_or(UploadError::NotAuthorizedToModify)?;
    let scope = access.scope_owner_id();
    let existing = ContentItem::get(id, scope, state.database())
        .await?
        .ok_or(UploadError::NotAuthorizedToModify)?;

    let content_type = match form.content_type.as_deref() {
        Some(kind) => Some(state.content_types().parse(kind)?),
        None => None,
    };

    let stored = state.media().put(&file.name, file.data).await?;
    let patch = ContentPatch {
        content_type,
        link: Some(stored.url.to_string()),
        title: form.title,
        tags: form.tags,
        media_key: Some(stored.key.clone()),
    };

    let updated = ContentItem::update(id, scope, &patch, access.attribution(), state.database())
        .await
        .map_err(UploadError::from)
        .and_then(|item| item.ok_or(UploadError::NotAuthorizedToModify));
    let item = match updated {
        Ok(item) => item,
        Err(e) => {
            if let Err(cleanup) = state.media().delete(&stored.key).await {
                tracing::warn!(key = %stored.key, error = %cleanup, "failed to remove orphaned upload");
            }
            return Err(e);
        }
    };

    if let Some(old_key) = existing.media_key {
        if let Err(e) = state.media().delete(&old_key).await {
            tracing::warn!(key = %old_key, error = %e, "failed to delete replaced media");
        }
    }

    tracing::info!(content = %item.id, key = %stored.key, %scope, "upload replaced");
    Ok(Json(serde_json::json!({
        "message": "File updated successfully",
        "content": item,
    })))
}

pub async fn delete_handler(
    State(state): State<ServiceState>,
    Access(access): Access,
    Path(path): Path<ContentPath>,
) -> Result<impl IntoResponse, UploadError> {
    access.ensure_can_edit()?;

    let id = parse_content_id(&path.content_id).ok_or(UploadError::NotAuthorizedToDelete)?;
    let deleted = ContentItem::delete(id, access.scope_owner_id(), state.database())
        .await?
        .ok_or(UploadError::NotAuthorizedToDelete)?;

    if let Some(key) = deleted.media_key {
        if let Err(e) = state.media().delete(&key).await {
            tracing::warn!(%key, error = %e, "failed to delete media for removed upload");
        }
    }

    tracing::info!(content = %id, scope = %access.scope_owner_id(), "upload deleted");
    Ok(message(StatusCode::OK, "File deleted successfully"))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("No file uploaded")]
    NoFile,
    #[error("No new file uploaded")]
    NoNewFile,
    #[error("File not found")]
    NotFound,
    #[error("{0}")]
    ContentType(#[from] ContentTypeError),
    #[error("You are not authorized to modify the data")]
    NotAuthorizedToModify,
    #[error("You are not authorized to delete the data")]
    NotAuthorizedToDelete,
    #[error("invalid upload form: {0}")]
    Multipart(#[from] MultipartError),
    #[error("media error: {0}")]
    Media(#[from] MediaStoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::Access(e) => AccessRejection(e).into_response(),
            UploadError::NotFound => message(StatusCode::NOT_FOUND, self.to_string()),
            UploadError::NoFile
            | UploadError::NoNewFile
            | UploadError::ContentType(_)
            | UploadError::NotAuthorizedToModify
            | UploadError::NotAuthorizedToDelete
            | UploadError::Multipart(_) => message(StatusCode::BAD_REQUEST, self.to_string()),
            UploadError::Media(_) | UploadError::Database(_) => {
                tracing::error!(error = %self, "upload request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: Option<&str>) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime: mime.map(str::to_string),
            data: Bytes::from_static(b"x"),
        }
    }

    #[test]
    fn test_infer_content_type() {
        assert_eq!(
            infer_content_type(&file("cat.png", Some("image/png"))),
            ContentType::Images
        );
        assert_eq!(infer_content_type(&file("clip.mp4", None)), ContentType::Videos);
        assert_eq!(
            infer_content_type(&file("notes.pdf", None)),
            ContentType::Documents
        );
        // the declared mime wins over the extension
        assert_eq!(
            infer_content_type(&file("cat.png", Some("application/octet-stream"))),
            ContentType::Documents
        );
    }
}

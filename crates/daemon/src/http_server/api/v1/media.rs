use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::message;
use crate::media::MediaStoreError;
use crate::ServiceState;

/// Serve a stored upload by key.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(key): Path<String>,
) -> Response {
    match state.media().get(&key).await {
        Ok(Some(data)) => {
            let mime = mime_guess::from_path(&key).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.to_string())],
                data,
            )
                .into_response()
        }
        Ok(None) | Err(MediaStoreError::InvalidKey(_)) => {
            message(StatusCode::NOT_FOUND, "File not found")
        }
        Err(e) => {
            tracing::error!(%key, error = %e, "failed to read media");
            message(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
        }
    }
}

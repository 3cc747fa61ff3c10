use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

pub mod auth;
pub mod brain;
pub mod content;
pub mod media;
pub mod uploads;

use crate::http_server::access::SHARE_LINK_PARAM;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let shared_prefix = format!("/shared/:{}", SHARE_LINK_PARAM);

    Router::new()
        .route("/healthCheck", get(health_check))
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler))
        .route("/brain/share", post(brain::share_handler))
        .route("/brain/:share_link", get(brain::shared_view_handler))
        .route("/toggleValue", get(brain::toggle_value_handler))
        .route("/toggleEditButton", patch(brain::toggle_edit_handler))
        .route("/media/*key", get(media::handler))
        .merge(content_routes())
        .nest(&shared_prefix, content_routes())
        .with_state(state)
}

/// Routes that act on a collection through [`Access`], either the caller's
///  own or, under `/shared/:shared_brain_link`, a shared one.
///
/// [`Access`]: crate::http_server::access::Access
fn content_routes() -> Router<ServiceState> {
    Router::new()
        .route(
            "/content",
            get(content::list_handler).post(content::create_handler),
        )
        .route(
            "/content/:content_id",
            patch(content::update_handler).delete(content::delete_handler),
        )
        .route("/upload", post(uploads::upload_handler))
        .route(
            "/uploads/:content_id",
            get(uploads::get_handler).patch(uploads::replace_handler),
        )
        .route("/deleteUploads/:content_id", delete(uploads::delete_handler))
}

async fn health_check() -> Response {
    message(StatusCode::OK, "Server is healthy")
}

/// `{"message": ...}` with a status, the shape of every plain reply.
pub(crate) fn message(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

/// Parse a content id from the path. Anything unparseable is treated like
///  an id that matches nothing.
pub(crate) fn parse_content_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Content id path segment. Extra params such as the share link are ignored.
#[derive(Debug, serde::Deserialize)]
pub struct ContentPath {
    pub content_id: String,
}

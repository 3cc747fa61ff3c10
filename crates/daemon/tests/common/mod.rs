#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use brainshare_daemon::http_server;
use brainshare_daemon::{ServiceConfig, ServiceState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "Str0ng!pass";

const BOUNDARY: &str = "brainshare-test-boundary";

/// The full application over an in-memory database and media store.
pub struct TestApp {
    pub state: ServiceState,
    router: Router,
}

pub async fn test_app() -> TestApp {
    let config = ServiceConfig::ephemeral(TEST_SECRET);
    let state = ServiceState::from_config(&config)
        .await
        .expect("failed to build test state");
    TestApp {
        router: http_server::router(state.clone()),
        state,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn message(&self) -> String {
        self.json()["message"]
            .as_str()
            .expect("response has no message")
            .to_string()
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body")
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.json(Method::GET, uri, token, None).await
    }

    /// Multipart request with an optional `uploadImage` file and text fields.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        file: Option<(&str, &str, &[u8])>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, mime, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploadImage\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let request = builder
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    /// Sign up and log in, returning the credential.
    pub async fn register(&self, username: &str) -> String {
        let signup = self
            .json(
                Method::POST,
                "/api/v1/signup",
                None,
                Some(serde_json::json!({"username": username, "password": PASSWORD})),
            )
            .await;
        assert_eq!(signup.status, StatusCode::OK, "signup failed for {username}");

        let login = self
            .json(
                Method::POST,
                "/api/v1/login",
                None,
                Some(serde_json::json!({"username": username, "password": PASSWORD})),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "login failed for {username}");
        login.json()["token"]
            .as_str()
            .expect("login returned no token")
            .to_string()
    }

    /// Create a link item through `prefix` (`/api/v1` or a shared prefix).
    pub async fn create_content(
        &self,
        prefix: &str,
        token: Option<&str>,
        title: &str,
    ) -> TestResponse {
        self.json(
            Method::POST,
            &format!("{prefix}/content"),
            token,
            Some(serde_json::json!({
                "type": "Links",
                "link": format!("https://example.com/{title}"),
                "title": title,
                "tags": ["rust", "reading"],
            })),
        )
        .await
    }

    /// Enable sharing and return the share token.
    pub async fn enable_sharing(&self, token: &str) -> String {
        let response = self
            .json(
                Method::POST,
                "/api/v1/brain/share",
                Some(token),
                Some(serde_json::json!({"share": true})),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["link"]
            .as_str()
            .expect("share returned no link")
            .to_string()
    }

    pub async fn list_titles(&self, prefix: &str, token: Option<&str>) -> Vec<String> {
        let response = self.get(&format!("{prefix}/content"), token).await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["userContentData"]
            .as_array()
            .expect("userContentData is not an array")
            .iter()
            .map(|item| item["title"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

pub fn shared(share_token: &str) -> String {
    format!("/api/v1/shared/{share_token}")
}

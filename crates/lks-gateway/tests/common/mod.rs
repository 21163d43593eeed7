use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lks_gateway::{router, state::ApiState, upstream::UsersApi};
use lks_storage::{ObjectStore, StorageError};
use serde::Deserialize;
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "lks-bucket";
pub const TEST_REGION: &str = "us-east-1";
pub const TEST_UPLOAD_LIMIT: usize = 64 * 1024;

/// An object captured by [`RecordingStore`].
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// In-memory object store that records uploads and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingStore {
    objects: Mutex<Vec<StoredObject>>,
    fail_with: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        })
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().expect("store lock poisoned").clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if let Some(message) = &self.fail_with {
            return Err(StorageError::Upload(message.clone()));
        }

        self.objects
            .lock()
            .expect("store lock poisoned")
            .push(StoredObject {
                key: key.to_string(),
                body: body.to_vec(),
                content_type: content_type.map(str::to_string),
            });
        Ok(())
    }
}

/// Upstream base URL for a mock server.
pub fn users_url(server: &wiremock::MockServer) -> String {
    format!("{}/users", server.uri())
}

/// Base URL on which nothing is listening.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let port = listener
        .local_addr()
        .expect("Probe listener has no address")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}/users")
}

/// Test state builder for creating an ApiState against a given upstream
pub struct TestStateBuilder {
    api_url: String,
    store: Arc<RecordingStore>,
}

impl TestStateBuilder {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            store: RecordingStore::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<RecordingStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> ApiState {
        ApiState {
            users: UsersApi::new(self.api_url).expect("Failed to build upstream client"),
            storage: self.store,
            bucket: TEST_BUCKET.to_string(),
            region: TEST_REGION.to_string(),
        }
    }
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(state: ApiState) -> Self {
        Self {
            router: router::app(state, TEST_UPLOAD_LIMIT),
        }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn put_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send("PUT", uri, Some(serde_json::to_string(body).expect("Failed to serialize body")))
            .await
    }

    pub async fn patch_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send("PATCH", uri, Some(serde_json::to_string(body).expect("Failed to serialize body")))
            .await
    }

    /// Send a `multipart/form-data` POST
    pub async fn post_form(&self, uri: &str, form: MultipartForm) -> TestResponse {
        let (content_type, body) = form.finish();

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .expect("Failed to build request");

        self.request(request).await
    }

    async fn send(&self, method: &str, uri: &str, json: Option<String>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);

        let request = match json {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json)),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// Value of the `error` field of a JSON error body
    pub fn error(&self) -> String {
        let json: serde_json::Value = self.json();
        json["error"]
            .as_str()
            .expect("Response has no error field")
            .to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

const BOUNDARY: &str = "lks-test-boundary-7MA4YWxkTrZu0gW";

/// Minimal `multipart/form-data` body builder
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A complete add-user form without an image
    pub fn user(name: &str, email: &str) -> Self {
        Self::new()
            .text("name", name)
            .text("email", email)
            .text("institution", "I")
            .text("position", "P")
            .text("phone", "000")
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

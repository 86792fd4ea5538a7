#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode, header},
};
use blog_api::{AppState, config::Config};
use serde_json::{Value, json};
use std::net::{IpAddr, Ipv4Addr};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BODY_LIMIT: usize = 5 * 1024 * 1024;
const BOUNDARY: &str = "X-BLOG-API-TEST-BOUNDARY";
/// Cheapest bcrypt work factor, keeps sign-ups fast.
const TEST_COST: u32 = 4;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: Vec<u8>,
}

impl<'a> FilePart<'a> {
    pub fn new(field: &'a str, file_name: &'a str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            field,
            file_name,
            bytes: bytes.into(),
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = TempDir::new().unwrap();
        let config = Config {
            jwt_secret: "integration-secret".to_string(),
            server_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            server_port: 0,
            upload_dir: uploads.path().to_path_buf(),
            max_body_bytes: BODY_LIMIT,
            bcrypt_cost: TEST_COST,
        };

        let state = AppState::new(&config);
        let router = blog_api::app(state.clone(), config.max_body_bytes);

        Self {
            router,
            state,
            uploads,
        }
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(json_request(
            Method::POST,
            "/api/users/register",
            None,
            json!({
                "name": name,
                "email": email,
                "password": password,
                "password2": password,
            }),
        ))
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(json_request(
            Method::POST,
            "/api/users/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
    }

    /// Registers and logs in, returning `(user id, token)`.
    pub async fn sign_up(&self, name: &str, email: &str) -> (String, String) {
        let (status, _) = self.register(name, email, "secret1").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self.login(email, "secret1").await;
        assert_eq!(status, StatusCode::OK);

        (
            body["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_post(&self, token: &str, title: &str, category: &str) -> Value {
        let (status, body) = self
            .send(multipart_request(
                Method::POST,
                "/api/posts",
                Some(token),
                &[
                    ("title", title),
                    ("category", category),
                    ("desc", "<p>A post body that is long enough.</p>"),
                ],
                Some(FilePart::new("thumbnail", "cover.png", b"png-bytes".to_vec())),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    pub fn upload_exists(&self, name: &str) -> bool {
        self.uploads.path().join(name).exists()
    }

    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).unwrap().count()
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use image::{ImageBuffer, ImageFormat, Rgb};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use recipe_api::database::MemoryStore;
use recipe_api::server;
use recipe_api::services::ImageStorage;
use recipe_api::state::AppState;

pub const PASSWORD: &str = "testpass123";
const BOUNDARY: &str = "recipe-api-test-boundary";

/// In-process application backed by a fresh memory store and media directory
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub media: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.body["field_errors"][field].as_str()
    }
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let media = tempfile::tempdir().context("failed to create media dir")?;
        let store = Arc::new(MemoryStore::new());
        let images = ImageStorage::new(media.path(), "/media", 1024 * 1024);
        let router = server::app(AppState::new(store.clone(), images));
        Ok(Self { router, store, media })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, body })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// POST a multipart body holding a single file field
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<TestResponse> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))?;
        self.send(request).await
    }

    pub async fn register(&self, email: &str) -> Result<TestResponse> {
        let body = json!({"email": email, "password": PASSWORD, "name": "Test Name"});
        self.request(Method::POST, "/api/user/create/", None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TestResponse> {
        let body = json!({"email": email, "password": password});
        self.request(Method::POST, "/api/user/token/", None, Some(body)).await
    }

    /// Register an account and return a bearer token for it
    pub async fn register_and_login(&self, email: &str) -> Result<String> {
        let registered = self.register(email).await?;
        anyhow::ensure!(registered.status == StatusCode::CREATED, "register failed: {}", registered.body);

        let login = self.login(email, PASSWORD).await?;
        login.data()["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> Result<i64> {
        let res = self.post("/api/recipe/tags/", token, json!({"name": name})).await?;
        res.data()["id"].as_i64().context("tag response has no id")
    }

    pub async fn create_ingredient(&self, token: &str, name: &str) -> Result<i64> {
        let res = self.post("/api/recipe/ingredients/", token, json!({"name": name})).await?;
        res.data()["id"].as_i64().context("ingredient response has no id")
    }

    pub async fn create_recipe(&self, token: &str, extra: Value) -> Result<i64> {
        let mut body = json!({"title": "Sample recipe", "time_minutes": 22, "price": "5.25"});
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }
        let res = self.post("/api/recipe/recipes/", token, body).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create recipe failed: {}", res.body);
        res.data()["id"].as_i64().context("recipe response has no id")
    }
}

pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// A small valid PNG
pub fn png_bytes() -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(10, 10, |x, y| Rgb([x as u8 * 20, y as u8 * 20, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

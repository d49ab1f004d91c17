#![allow(dead_code)]

use atelier::api;
use atelier::config::Config;
use atelier::services::{FileStorage, LocalStorage};
use atelier::state::SharedState;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub use atelier::db::migrator::DEFAULT_API_KEY;

pub const BOUNDARY: &str = "atelier-test-boundary";

/// A router over its own sqlite file and storage directory.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<SharedState>,
    pub root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_storage(|root| -> Arc<dyn FileStorage> { Arc::new(LocalStorage::new(root)) }).await
}

/// Like [`spawn_app`], with the file store built from the storage directory.
pub async fn spawn_app_with_storage(
    storage: impl FnOnce(PathBuf) -> Arc<dyn FileStorage>,
) -> TestApp {
    let root = std::env::temp_dir().join(format!("atelier-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();

    let mut config = Config::default();
    config.general.database_path = format!("sqlite://{}?mode=rwc", root.join("atelier.db").display());
    config.media.storage_path = root.join("storage").display().to_string();
    config.server.secure_cookies = false;

    let storage = storage(root.join("storage"));
    let state = Arc::new(
        SharedState::with_storage(config, storage)
            .await
            .expect("Failed to create shared state"),
    );
    let app_state = api::create_app_state(state.clone(), None).await;
    let router = api::router(app_state).await;

    TestApp {
        router,
        state,
        root,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_json(&self, uri: &str) -> serde_json::Value {
        let response = self.get(uri).await;
        assert_eq!(response.status(), 200, "GET {uri}");
        body_json(response).await
    }

    pub async fn form(&self, method: &str, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(&self, method: &str, uri: &str, parts: &[Part]) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Logs in as the seeded admin and returns the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=admin&password=password"))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/work");

        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("session cookie")
            .to_string()
    }

    /// Creates an artist through the API and returns its id.
    pub async fn create_artist(&self, name: &str) -> i32 {
        let response = self.form("POST", "/artists", &format!("name={name}")).await;
        assert_eq!(response.status(), 303);
        self.state
            .store
            .list_all_artists()
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.name == name)
            .map(|a| a.id.value())
            .max()
            .unwrap()
    }
}

impl TestApp {
    /// Every regular file under the storage directory.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &std::path::Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path);
                }
            }
        }

        let mut files = Vec::new();
        walk(&self.root.join("storage"), &mut files);
        files
    }
}

pub enum Part {
    Text(&'static str, String),
    File(&'static str, &'static str, Vec<u8>),
}

pub fn text(name: &'static str, value: impl Into<String>) -> Part {
    Part::Text(name, value.into())
}

pub fn file(name: &'static str, file_name: &'static str, bytes: Vec<u8>) -> Part {
    Part::File(name, file_name, bytes)
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn image_bytes(format: image::ImageFormat) -> Vec<u8> {
    let image = image::DynamicImage::new_rgb8(8, 8);
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

//! Shared harness: the full router over an in-memory backend.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use neon_genesis::backend::{
    ActorHandle, Category, MemoryBackend, NewPost, PostId, Principal, VirtualPrototype,
};
use neon_genesis::config::Config;
use neon_genesis::routes;
use neon_genesis::state::AppState;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parsed `HX-Trigger` notice as `(level, message)`.
    pub fn notice(&self) -> Option<(String, String)> {
        let raw = self.headers.get("hx-trigger")?.to_str().ok()?;
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let notify = value.get("notify")?;
        Some((
            notify["level"].as_str()?.to_string(),
            notify["message"].as_str()?.to_string(),
        ))
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION)?.to_str().ok()
    }
}

pub struct TestApp {
    pub backend: Arc<MemoryBackend>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        Self::with_actor(backend.clone(), ActorHandle::ready(backend))
    }

    /// App whose backend has not been installed yet.
    pub fn uninitialized() -> Self {
        Self::with_actor(Arc::new(MemoryBackend::new()), ActorHandle::empty())
    }

    fn with_actor(backend: Arc<MemoryBackend>, actor: ActorHandle) -> Self {
        let state = AppState::new(Config::default(), actor);
        let router = routes::router(state.clone());
        Self {
            backend,
            state,
            router,
        }
    }

    /// Start a session directly and return the `Cookie` header value.
    pub async fn login(&self, principal: &str) -> String {
        let token = self
            .state
            .sessions
            .lock()
            .await
            .create(Principal::new(principal));
        format!("{}={}", self.state.config.auth.cookie_name, token)
    }

    pub fn seed(&self, title: &str, category: Category) -> PostId {
        self.backend.seed_post(
            &Principal::new("seed-author"),
            NewPost {
                title: title.to_string(),
                description: format!("{} description", title),
                category,
                virtual_prototype: None,
            },
        )
    }

    pub fn seed_with_prototype(&self, title: &str, prototype: VirtualPrototype) -> PostId {
        self.backend.seed_post(
            &Principal::new("seed-author"),
            NewPost {
                title: title.to_string(),
                description: format!("{} description", title),
                category: Category::Environmental,
                virtual_prototype: Some(prototype),
            },
        )
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

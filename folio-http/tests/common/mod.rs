#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use folio_core::{ContactConfig, ContactMailer};
use folio_http::{build_router, ServerState};
use folio_provider::{ChatKitClient, ChatKitConfig, ResendClient, ResendConfig};
use serde_json::Value;
use tower::ServiceExt;

/// One request received by the mock provider.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Stand-in for the external providers, listening on an ephemeral port.
pub struct MockProvider {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Answers every request on `path` with `status` and `body`.
    pub async fn start(path: &str, status: StatusCode, body: &'static str) -> Self {
        let calls: Arc<Mutex<Vec<RecordedCall>>> = Arc::default();
        let recorded = calls.clone();
        let route = path.to_string();
        let app = Router::new().route(
            path,
            axum::routing::post(move |method: Method, headers: HeaderMap, request: String| {
                let recorded = recorded.clone();
                let route = route.clone();
                async move {
                    recorded.lock().unwrap().push(RecordedCall {
                        method,
                        path: route,
                        headers,
                        body: request,
                    });
                    (status, body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            calls,
        }
    }

    pub async fn chatkit(status: StatusCode, body: &'static str) -> Self {
        Self::start("/chatkit/sessions", status, body).await
    }

    pub async fn resend(status: StatusCode, body: &'static str) -> Self {
        Self::start("/emails", status, body).await
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub fn chatkit_client(base_url: &str, api_key: Option<&str>) -> ChatKitClient {
    ChatKitClient::new(
        ChatKitConfig::new(api_key.map(String::from))
            .with_base_url(base_url)
            .with_workflow_id("wf_portfolio"),
    )
}

pub fn contact_mailer(base_url: &str, api_key: Option<&str>) -> ContactMailer {
    ContactMailer::new(
        ContactConfig::new("Portfolio <noreply@example.com>", vec!["owner@example.com".into()]),
        ResendClient::new(ResendConfig::new(api_key.map(String::from)).with_base_url(base_url)),
    )
}

/// Router whose chat client talks to `chatkit` and whose mailer talks to an
/// unreachable address.
pub fn chat_router(chatkit: &MockProvider, api_key: Option<&str>) -> Router {
    build_router(ServerState::new(
        chatkit_client(&chatkit.url, api_key),
        contact_mailer("http://127.0.0.1:9", None),
    ))
}

pub fn contact_router(resend: &MockProvider, api_key: Option<&str>) -> Router {
    build_router(ServerState::new(
        chatkit_client("http://127.0.0.1:9", None),
        contact_mailer(&resend.url, api_key),
    ))
}

/// POST `body` (raw) to `uri` and return the status and the JSON response.
pub async fn post_raw(router: Router, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let content_type = body.map(|_| "application/json");
    post(router, uri, body, content_type).await
}

/// Like [`post_raw`] but never sets a `content-type` header.
pub async fn post_untyped(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    post(router, uri, Some(body), None).await
}

async fn post(router: Router, uri: &str, body: Option<&str>, content_type: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, Some(&body.to_string())).await
}

//! Strict scripted transport
//!
//! Tests register the calls they expect, each with a canned outcome. Every
//! outbound request must match a pending expectation (method and path);
//! anything else panics. Expectations for the same route are consumed in
//! registration order, while different routes may interleave freely so
//! concurrent callers do not have to race in a fixed order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use qa_client::http::{ApiRequest, ApiResponse, HttpTransport, Method};
use qa_client::{
    ApiClient, ClientBuilder, ClientConfig, ClientError, MemoryTokenStore, TokenPair, TokenStore,
};

/// Base URL every scripted client points at.
pub const BASE_URL: &str = "http://qa.test/api";

#[derive(Debug)]
enum Outcome {
    Respond(ApiResponse),
    Fail(String),
}

#[derive(Debug)]
struct Expectation {
    method: Method,
    path: String,
    delay: Option<Duration>,
    outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pending: Mutex<Vec<Expectation>>,
    recorded: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, delay: Option<Duration>, outcome: Outcome) {
        self.pending.lock().push(Expectation {
            method,
            path: path.to_string(),
            delay,
            outcome,
        });
    }

    /// Expect `method path` and answer with `response`.
    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) -> &Self {
        self.push(method, path, None, Outcome::Respond(response));
        self
    }

    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.respond(method, path, ApiResponse::json_body(status, &body))
    }

    /// Like `respond_json`, but the answer arrives only after `delay`.
    pub fn respond_json_after(
        &self,
        delay: Duration,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
    ) -> &Self {
        self.push(
            method,
            path,
            Some(delay),
            Outcome::Respond(ApiResponse::json_body(status, &body)),
        );
        self
    }

    /// Expect `method path` and fail it at the transport level.
    pub fn fail(&self, method: Method, path: &str, detail: &str) -> &Self {
        self.push(method, path, None, Outcome::Fail(detail.to_string()));
        self
    }

    /// Every request sent so far, in send order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.recorded.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.recorded
            .lock()
            .iter()
            .filter(|r| path_of(&r.url) == path)
            .cloned()
            .collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    pub fn remaining(&self) -> usize {
        self.pending.lock().len()
    }

    /// Panic unless every registered expectation was consumed.
    pub fn verify(&self) {
        let pending = self.pending.lock();
        if !pending.is_empty() {
            let routes: Vec<String> = pending
                .iter()
                .map(|e| format!("{} {}", e.method, e.path))
                .collect();
            panic!("ScriptedTransport: unmet expectations: {routes:?}");
        }
    }
}

/// Path and query relative to `BASE_URL`.
fn path_of(url: &str) -> &str {
    url.strip_prefix(BASE_URL).unwrap_or(url)
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let path = path_of(&request.url).to_string();
        self.recorded.lock().push(request.clone());

        let expectation = {
            let mut pending = self.pending.lock();
            match pending
                .iter()
                .position(|e| e.method == request.method && e.path == path)
            {
                Some(index) => pending.remove(index),
                None => panic!(
                    "ScriptedTransport: unexpected request {} {path}",
                    request.method
                ),
            }
        };
        debug!(method = %request.method, path, "Scripted response");

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        match expectation.outcome {
            Outcome::Respond(response) => Ok(response),
            Outcome::Fail(detail) => Err(ClientError::network(detail)),
        }
    }
}

/// Client wired to `transport` with an in-memory store holding `tokens`.
///
/// The session is rehydrated from the store, so passing tokens yields an
/// authenticated client without going through login.
pub fn test_client(transport: Arc<ScriptedTransport>, tokens: Option<TokenPair>) -> ApiClient {
    let store = match tokens {
        Some(tokens) => MemoryTokenStore::with_tokens(tokens),
        None => MemoryTokenStore::new(),
    };
    test_client_with_store(transport, Arc::new(store))
}

pub fn test_client_with_store(
    transport: Arc<ScriptedTransport>,
    store: Arc<dyn TokenStore>,
) -> ApiClient {
    let config = ClientConfig::new(BASE_URL).expect("test base url is valid");
    let client = ClientBuilder::new(config)
        .with_transport(transport)
        .with_store(store)
        .build()
        .expect("scripted client builds");
    client.session().rehydrate().expect("test store loads");
    client
}

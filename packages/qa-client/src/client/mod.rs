//! Authenticated API client.
//!
//! Every call carries the current bearer token. A 401 triggers at most one
//! token refresh (shared with any concurrent caller that hit the same 401)
//! and exactly one replay; the replay's response is final.

mod refresh;

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{
    build_headers, ApiRequest, ApiResponse, HttpTransport, MultipartForm, RequestOptions,
    ReqwestTransport,
};
use crate::session::{FileTokenStore, SessionHolder, TokenStore};

/// Where a single logical request currently stands.
///
/// `Requesting -> (done | Refreshing) -> Replaying -> done`. A failed
/// refresh leaves the machine with `SessionExpired`.
#[derive(Debug)]
enum Phase {
    Requesting { token: String },
    Refreshing { stale: String },
    Replaying { token: String },
}

pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionHolder>,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionHolder>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionHolder> {
        &self.session
    }

    /// Issue an authenticated request against an API path such as `/standards/`.
    ///
    /// Any status other than 401 is returned unmodified. Errors:
    /// - `Unauthenticated` when no access token is held (nothing is sent)
    /// - `SessionExpired` when the 401-triggered refresh fails (session cleared, no replay)
    /// - `Network` for transport failures of the original or replayed call
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let Some(token) = self.session.access_token() else {
            debug!(path, "No access token; refusing to send");
            return Err(ClientError::unauthenticated());
        };

        let mut phase = Phase::Requesting { token };
        loop {
            phase = match phase {
                Phase::Requesting { token } => {
                    let response = self.send_with(&token, path, &options).await?;
                    if !response.is_unauthorized() {
                        return Ok(response);
                    }
                    debug!(path, "Got 401; refreshing access token");
                    Phase::Refreshing { stale: token }
                }
                Phase::Refreshing { stale } => {
                    let token = self.refresh_after(&stale).await?;
                    Phase::Replaying { token }
                }
                Phase::Replaying { token } => {
                    let response = self.send_with(&token, path, &options).await?;
                    debug!(path, status = response.status, "Replayed request");
                    return Ok(response);
                }
            };
        }
    }

    async fn send_with(
        &self,
        token: &str,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method: options.method.clone(),
            url: self.config.endpoint(path),
            headers: build_headers(token, options),
            body: options.body.clone(),
        };
        debug!(method = %request.method, path, "Sending request");
        self.transport.send(request).await
    }

    /// Send without a bearer token; only login uses this.
    pub(crate) async fn transport_send(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, ClientError> {
        self.transport.send(request).await
    }

    /// GET and decode a 2xx JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(path, RequestOptions::get())
            .await?
            .error_for_status()?
            .json()
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        self.request(path, RequestOptions::get())
            .await?
            .error_for_status()?
            .json_or_null()
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        let options = RequestOptions::post().with_json(body)?;
        self.request(path, options)
            .await?
            .error_for_status()?
            .json_or_null()
    }

    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        let options = RequestOptions::patch().with_json(body)?;
        self.request(path, options)
            .await?
            .error_for_status()?
            .json_or_null()
    }

    /// POST with no body, for action endpoints like `/requests/{id}/approve/`.
    pub async fn post_empty(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        self.request(path, RequestOptions::post())
            .await?
            .error_for_status()?
            .json_or_null()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(path, RequestOptions::delete())
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn send_multipart(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<serde_json::Value, ClientError> {
        let options = RequestOptions::post().with_multipart(form);
        self.request(path, options)
            .await?
            .error_for_status()?
            .json_or_null()
    }

    /// GET a binary payload (exports, attachment files) without decoding it.
    pub async fn download(&self, path: &str) -> Result<Bytes, ClientError> {
        Ok(self
            .request(path, RequestOptions::get())
            .await?
            .error_for_status()?
            .bytes())
    }
}

/// Builder for `ApiClient` (used in both tests and the CLI)
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn TokenStore>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Defaults: `ReqwestTransport` and a `FileTokenStore` at `config.token_file`.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let store: Arc<dyn TokenStore> = match self.store {
            Some(s) => s,
            None => Arc::new(FileTokenStore::new(self.config.token_file.clone())),
        };
        let session = Arc::new(SessionHolder::new(store));
        Ok(ApiClient::new(self.config, transport, session))
    }
}

pub fn build_client(config: ClientConfig) -> ClientBuilder {
    ClientBuilder::new(config)
}

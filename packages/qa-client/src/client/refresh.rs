use std::time::Instant;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::ApiClient;
use crate::error::ClientError;
use crate::http::request::{APPLICATION_JSON, CONTENT_TYPE};
use crate::http::{ApiRequest, RequestBody};

pub(crate) const REFRESH_PATH: &str = "/token/refresh/";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

impl ApiClient {
    /// Force a refresh with the stored refresh token.
    ///
    /// On any failure the session that sent the refresh is cleared and
    /// `SessionExpired` is returned; on success the new access token is
    /// persisted and returned. A session replaced by a login mid-refresh is
    /// left untouched either way.
    pub async fn refresh_access_token(&self) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;
        self.perform_refresh().await
    }

    /// Obtain a token to replay with after `stale` was rejected.
    ///
    /// Refreshes are serialized: whoever takes the lock first talks to the
    /// server, and later callers reuse its outcome:
    /// 1. acquire the refresh lock
    /// 2. session token differs from `stale` → someone already refreshed, reuse it
    /// 3. session empty → a concurrent refresh failed (or logout), `SessionExpired`
    /// 4. otherwise refresh now
    pub(super) async fn refresh_after(&self, stale: &str) -> Result<String, ClientError> {
        let wait_start = Instant::now();
        let _guard = self.refresh_lock.lock().await;
        let wait_ms = wait_start.elapsed().as_millis();
        if wait_ms > 0 {
            debug!(wait_ms, "Waited for concurrent token refresh");
        }

        match self.session.access_token() {
            None => {
                debug!("Session ended while waiting for refresh");
                Err(ClientError::session_expired())
            }
            Some(current) if current != stale => {
                debug!("Reusing access token refreshed by concurrent request");
                Ok(current)
            }
            Some(_) => self.perform_refresh().await,
        }
    }

    /// Caller must hold `refresh_lock`.
    ///
    /// Login and logout do not take the lock, so the session may change while
    /// the refresh is in flight. Both the update and the clear on failure only
    /// apply while the session still holds the refresh token that was sent.
    async fn perform_refresh(&self) -> Result<String, ClientError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("No refresh token; ending session");
            self.session.clear();
            return Err(ClientError::session_expired());
        };

        let request = ApiRequest {
            method: reqwest::Method::POST,
            url: self.config.endpoint(REFRESH_PATH),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: RequestBody::Json(json!({ "refresh": refresh_token }).to_string()),
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed; ending session");
                return Err(self.expire_session(&refresh_token));
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "Token refresh rejected; ending session");
            return Err(self.expire_session(&refresh_token));
        }

        let access = match response.json::<RefreshResponse>() {
            Ok(RefreshResponse {
                access: Some(access),
                refresh,
            }) if !access.is_empty() => {
                self.session
                    .update_access_token(&refresh_token, access, refresh)?
                    .access
            }
            _ => {
                warn!("Token refresh response has no access token; ending session");
                return Err(self.expire_session(&refresh_token));
            }
        };

        info!("Access token refreshed");
        Ok(access)
    }

    fn expire_session(&self, sent_refresh: &str) -> ClientError {
        self.session.clear_if_refresh_token(sent_refresh);
        ClientError::session_expired()
    }
}

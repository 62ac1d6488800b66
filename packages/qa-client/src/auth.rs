//! Login, logout and current-user lookup on top of the authenticated client.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::http::request::{APPLICATION_JSON, CONTENT_TYPE};
use crate::http::{ApiRequest, RequestBody};
use crate::logging::pii::Redacted;
use crate::session::{TokenPair, UserProfile};

pub const LOGIN_PATH: &str = "/token/";
pub const CURRENT_USER_PATH: &str = "/users/me/";

impl ApiClient {
    /// Exchange credentials for a token pair, then load the user profile.
    ///
    /// Bad credentials surface as `InvalidCredentials` with the server's
    /// `detail` message. If the profile lookup fails after a successful
    /// token exchange the tokens stay in place and the lookup error is
    /// returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = ApiRequest {
            method: reqwest::Method::POST,
            url: self.config().endpoint(LOGIN_PATH),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: RequestBody::Json(json!({ "email": email, "password": password }).to_string()),
        };

        let response = self.transport_send(request).await?;
        if !response.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Invalid credentials".to_string());
            warn!(email = %Redacted(email), status = response.status, "Login rejected");
            return Err(ClientError::invalid_credentials(detail));
        }

        let tokens: TokenPair = response.json()?;
        self.session().login(tokens)?;
        info!(email = %Redacted(email), "Logged in");

        self.fetch_current_user().await
    }

    /// End the session locally. The API keeps no server-side session to revoke.
    pub fn logout(&self) {
        self.session().clear();
    }

    /// Load `/users/me/` and remember it as the current user.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, ClientError> {
        let user: UserProfile = self.get(CURRENT_USER_PATH).await?;
        debug!(role = %user.role, "Loaded current user");
        self.session().set_user(user.clone());
        Ok(user)
    }

    /// Bring a persisted session back to life at startup.
    ///
    /// Loads the stored tokens and fetches the user. A rejected lookup gets
    /// one forced refresh and a second attempt; if that also fails the
    /// session is dropped and `Ok(None)` returned. Network errors are
    /// returned as-is with the tokens kept, so an offline start does not
    /// sign the user out.
    pub async fn restore(&self) -> Result<Option<UserProfile>, ClientError> {
        if !self.session().rehydrate()? {
            return Ok(None);
        }

        match self.fetch_current_user().await {
            Ok(user) => return Ok(Some(user)),
            Err(e) if e.is_auth_failure() => return Ok(None),
            Err(e @ ClientError::Network { .. }) => return Err(e),
            Err(e) => debug!(error = %e, "Current user lookup failed; trying a refresh"),
        }

        if self.session().refresh_token().is_none() {
            self.logout();
            return Ok(None);
        }
        if self.refresh_access_token().await.is_err() {
            return Ok(None);
        }

        match self.fetch_current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Could not restore session; logging out");
                self.logout();
                Ok(None)
            }
        }
    }
}

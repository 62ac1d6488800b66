use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Session expired")]
    SessionExpired,
    #[error("Invalid credentials: {detail}")]
    InvalidCredentials { detail: String },
    #[error("Request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },
    #[error("Network error: {detail}")]
    Network { detail: String },
    #[error("Decode error: {detail}")]
    Decode { detail: String },
    #[error("Storage error: {detail}")]
    Storage { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl ClientError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Unauthenticated => "UNAUTHENTICATED",
            ClientError::SessionExpired => "SESSION_EXPIRED",
            ClientError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            ClientError::RequestFailed { .. } => "REQUEST_FAILED",
            ClientError::Network { .. } => "NETWORK_ERROR",
            ClientError::Decode { .. } => "DECODE_ERROR",
            ClientError::Storage { .. } => "STORAGE_ERROR",
            ClientError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// HTTP status of the response that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the caller has to send the user back to the login screen.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::SessionExpired
        )
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthenticated
    }

    pub fn session_expired() -> Self {
        Self::SessionExpired
    }

    pub fn invalid_credentials(detail: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            detail: detail.into(),
        }
    }

    pub fn request_failed(status: u16, detail: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Decode {
            detail: detail.into(),
        }
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        Self::Storage {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::decode(format!("response body: {e}"))
        } else {
            ClientError::network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::decode(format!("json: {e}"))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::storage(format!("io: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;

    #[test]
    fn auth_failures_are_flagged_for_login_redirect() {
        assert!(ClientError::unauthenticated().is_auth_failure());
        assert!(ClientError::session_expired().is_auth_failure());
        assert!(!ClientError::request_failed(403, "nope").is_auth_failure());
        assert!(!ClientError::network("offline").is_auth_failure());
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            ClientError::unauthenticated(),
            ClientError::session_expired(),
            ClientError::invalid_credentials("x"),
            ClientError::request_failed(500, "x"),
            ClientError::network("x"),
            ClientError::decode("x"),
            ClientError::storage("x"),
            ClientError::config("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn status_only_on_request_failed() {
        assert_eq!(ClientError::request_failed(404, "gone").status(), Some(404));
        assert_eq!(ClientError::session_expired().status(), None);
    }

    #[test]
    fn display_includes_detail() {
        let err = ClientError::request_failed(400, "title is required");
        assert_eq!(err.to_string(), "Request failed (400): title is required");
    }
}

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod breadcrumb;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod resources;
pub mod session;

// Re-exports for public API
pub use breadcrumb::{BreadcrumbTrail, Crumb, EntityKind, LabelCache, LabelResolver, LabelSource};
pub use client::{build_client, ApiClient, ClientBuilder};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::{ApiRequest, ApiResponse, HttpTransport, MultipartForm, RequestBody, RequestOptions};
pub use resources::{FileUpload, RequestAction};
pub use session::{
    FileTokenStore, MemoryTokenStore, Role, Session, SessionHolder, TokenPair, TokenStore,
    UserProfile,
};

// Prelude for test convenience
pub mod prelude {
    pub use super::breadcrumb::*;
    pub use super::client::*;
    pub use super::config::*;
    pub use super::error::*;
    pub use super::http::*;
    pub use super::resources::*;
    pub use super::session::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    client_test_support::logging::init();
}

//! Client test support utilities
//!
//! A scripted in-memory transport for driving `qa_client::ApiClient`
//! without a server, plus unified test logging.

pub mod logging;
pub mod scripted;

pub use scripted::{test_client, test_client_with_store, ScriptedTransport, BASE_URL};

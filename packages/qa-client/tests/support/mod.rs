#![allow(dead_code)]

use qa_client::TokenPair;
use serde_json::{json, Value};

pub use client_test_support::{test_client, test_client_with_store, ScriptedTransport};

// Logging is auto-installed for every test binary that pulls in this module
#[ctor::ctor]
fn init_logging() {
    client_test_support::logging::init();
}

pub fn tokens(access: &str, refresh: &str) -> TokenPair {
    TokenPair::new(access, Some(refresh.to_string()))
}

pub fn admin_json() -> Value {
    json!({
        "id": 7,
        "username": "qa.admin",
        "email": "admin@uni.test",
        "role": "ADMIN",
        "first_name": "Hala",
        "last_name": "Nasser"
    })
}

pub fn standards_page() -> Value {
    json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {"id": "s-1", "title": "Mission"},
            {"id": "s-2", "title": "Governance"}
        ]
    })
}

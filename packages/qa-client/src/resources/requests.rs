use std::ops::Deref;

use serde_json::{json, Value};

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;

/// Decision an admin can take on a pending access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Approve,
    Reject,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestAction::Approve => "approve",
            RequestAction::Reject => "reject",
        }
    }
}

/// Requests for access to another user's attachment.
pub struct AccessRequests<'a> {
    inner: Collection<'a>,
}

impl<'a> AccessRequests<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/requests/"),
        }
    }

    /// Ask for access to an attachment.
    pub async fn request_access(&self, attachment: &str) -> Result<Value, ClientError> {
        self.create(&json!({ "made_on": attachment })).await
    }

    pub async fn pending_for(&self, requester: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("requester", requester), ("status", "PENDING")])
            .await
    }

    pub async fn act(&self, id: &str, action: RequestAction) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&self.action_path(id, action.as_str()))
            .await
    }

    /// Withdraw one's own pending request.
    pub async fn cancel(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&self.action_path(id, "cancel"))
            .await
    }
}

impl<'a> Deref for AccessRequests<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

use std::ops::Deref;

use serde_json::Value;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;

/// Indicators live under `/pointers/` in the API.
pub struct Indicators<'a> {
    inner: Collection<'a>,
}

impl<'a> Indicators<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/pointers/"),
        }
    }

    pub async fn for_standard(&self, standard: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("standard", standard)]).await
    }
}

impl<'a> Deref for Indicators<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

use std::ops::Deref;

use serde_json::Value;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;

pub struct Elements<'a> {
    inner: Collection<'a>,
}

impl<'a> Elements<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/elements/"),
        }
    }

    pub async fn for_indicator(&self, indicator: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("pointer", indicator)]).await
    }
}

impl<'a> Deref for Elements<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

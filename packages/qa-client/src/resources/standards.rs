use std::ops::Deref;

use serde_json::Value;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;

pub struct Standards<'a> {
    inner: Collection<'a>,
}

impl<'a> Standards<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/standards/"),
        }
    }

    pub async fn for_year(&self, academic_year: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("academic_year", academic_year)]).await
    }
}

impl<'a> Deref for Standards<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

use std::ops::Deref;

use bytes::Bytes;
use serde_json::Value;

use super::{extract_items, Collection};
use crate::client::ApiClient;
use crate::error::ClientError;

pub struct AcademicYears<'a> {
    inner: Collection<'a>,
}

impl<'a> AcademicYears<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/academic-years/"),
        }
    }

    /// The year currently marked ACTIVE, if any.
    pub async fn active(&self) -> Result<Option<Value>, ClientError> {
        let body = self.list_page(&[("status", "ACTIVE")]).await?;
        Ok(extract_items(body).into_iter().next())
    }

    pub async fn statistics(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .get_json(&self.action_path(id, "statistics"))
            .await
    }

    /// Full export of a year as the server renders it (a JSON document,
    /// returned unparsed).
    pub async fn export(&self, id: &str) -> Result<Bytes, ClientError> {
        self.client().download(&self.action_path(id, "export")).await
    }

    /// Open a new academic year; the server rolls the structure forward.
    pub async fn create_new_year(&self, body: &Value) -> Result<Value, ClientError> {
        self.client()
            .post_json(&format!("{}create_new_year/", self.path()), body)
            .await
    }
}

impl<'a> Deref for AcademicYears<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

use std::ops::Deref;

use serde_json::Value;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::session::Role;

pub struct Users<'a> {
    inner: Collection<'a>,
}

impl<'a> Users<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/users/"),
        }
    }

    pub async fn by_role(&self, role: Role) -> Result<Vec<Value>, ClientError> {
        self.list(&[("role", role.as_str())]).await
    }
}

impl<'a> Deref for Users<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

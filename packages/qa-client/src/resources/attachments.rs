use std::ops::Deref;

use bytes::Bytes;
use serde_json::Value;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::http::MultipartForm;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub(crate) fn into_form(self, field: &str) -> MultipartForm {
        MultipartForm::new().file(field, self.file_name, self.mime, self.bytes)
    }
}

/// Evidence slots attached to an element.
pub struct Attachments<'a> {
    inner: Collection<'a>,
}

impl<'a> Attachments<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/attachments/"),
        }
    }

    pub async fn for_element(&self, element: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("element", element)]).await
    }

    /// Put a file into an existing attachment slot.
    pub async fn upload(&self, id: &str, file: FileUpload) -> Result<Value, ClientError> {
        self.client()
            .send_multipart(&self.action_path(id, "upload"), file.into_form("file"))
            .await
    }

    /// Remove the uploaded file but keep the slot.
    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        self.client().delete(&self.action_path(id, "remove")).await
    }

    pub async fn download(&self, id: &str) -> Result<Bytes, ClientError> {
        self.client().download(&self.action_path(id, "download")).await
    }
}

impl<'a> Deref for Attachments<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

//! Thin typed wrappers over the accreditation API's collections.
//!
//! Payloads stay opaque `serde_json::Value`s; these wrappers only know
//! paths, filters and which endpoints take multipart or return binary.

pub mod academic_years;
pub mod attachments;
pub mod courses;
pub mod elements;
pub mod indicators;
pub mod requests;
pub mod standards;
pub mod users;

use reqwest::Url;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ClientError;

pub use academic_years::AcademicYears;
pub use attachments::{Attachments, FileUpload};
pub use courses::{CourseAttachments, CourseFiles, Courses};
pub use elements::Elements;
pub use indicators::Indicators;
pub use requests::{AccessRequests, RequestAction};
pub use standards::Standards;
pub use users::Users;

/// Append URL-encoded query pairs to an API path.
pub fn with_query(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    // Any absolute base works; only the encoded query string is kept.
    let mut url = match Url::parse("http://placeholder.invalid/") {
        Ok(url) => url,
        Err(_) => return path.to_string(),
    };
    url.query_pairs_mut().extend_pairs(query);
    let encoded = url.query().unwrap_or_default();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{encoded}")
}

/// Items of a list response: `{"results": [...]}` when paginated, or a bare array.
pub fn extract_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// A REST collection rooted at `path` (always with a trailing slash).
#[derive(Clone, Copy)]
pub struct Collection<'a> {
    client: &'a ApiClient,
    path: &'static str,
}

impl<'a> Collection<'a> {
    pub fn new(client: &'a ApiClient, path: &'static str) -> Self {
        Self { client, path }
    }

    pub fn client(&self) -> &'a ApiClient {
        self.client
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}{id}/", self.path)
    }

    pub fn action_path(&self, id: &str, action: &str) -> String {
        format!("{}{id}/{action}/", self.path)
    }

    /// Raw list body, pagination envelope included.
    pub async fn list_page(&self, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        self.client.get_json(&with_query(self.path, query)).await
    }

    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<Value>, ClientError> {
        Ok(extract_items(self.list_page(query).await?))
    }

    pub async fn get(&self, id: &str) -> Result<Value, ClientError> {
        self.client.get_json(&self.item_path(id)).await
    }

    pub async fn create(&self, body: &Value) -> Result<Value, ClientError> {
        self.client.post_json(self.path, body).await
    }

    /// Partial update (PATCH).
    pub async fn update(&self, id: &str, body: &Value) -> Result<Value, ClientError> {
        self.client.patch_json(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&self.item_path(id)).await
    }
}

impl ApiClient {
    pub fn academic_years(&self) -> AcademicYears<'_> {
        AcademicYears::new(self)
    }

    pub fn courses(&self) -> Courses<'_> {
        Courses::new(self)
    }

    pub fn course_files(&self) -> CourseFiles<'_> {
        CourseFiles::new(self)
    }

    pub fn course_attachments(&self) -> CourseAttachments<'_> {
        CourseAttachments::new(self)
    }

    pub fn standards(&self) -> Standards<'_> {
        Standards::new(self)
    }

    pub fn indicators(&self) -> Indicators<'_> {
        Indicators::new(self)
    }

    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self)
    }

    pub fn attachments(&self) -> Attachments<'_> {
        Attachments::new(self)
    }

    pub fn access_requests(&self) -> AccessRequests<'_> {
        AccessRequests::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }
}

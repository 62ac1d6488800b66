use std::ops::Deref;

use bytes::Bytes;
use serde_json::Value;

use super::attachments::FileUpload;
use super::{extract_items, with_query, Collection};
use crate::client::ApiClient;
use crate::error::ClientError;

pub struct Courses<'a> {
    inner: Collection<'a>,
}

impl<'a> Courses<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/courses/"),
        }
    }

    pub async fn for_year(&self, academic_year: &str) -> Result<Vec<Value>, ClientError> {
        self.list(&[("academic_year", academic_year)]).await
    }
}

impl<'a> Deref for Courses<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Named document slots of a course (syllabus, evaluation, ...).
pub struct CourseFiles<'a> {
    inner: Collection<'a>,
}

impl<'a> CourseFiles<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/course-files/"),
        }
    }

    /// Files of a course. The API answers 404 or 400 when a course has
    /// none yet; both read as an empty list.
    pub async fn for_course(
        &self,
        course: &str,
        academic_year: Option<&str>,
    ) -> Result<Vec<Value>, ClientError> {
        let mut query = vec![("course", course)];
        if let Some(year) = academic_year {
            query.push(("academic_year", year));
        }
        let response = self
            .client()
            .request(&with_query(self.path(), &query), Default::default())
            .await?;
        if response.status == 404 || response.status == 400 {
            return Ok(Vec::new());
        }
        Ok(extract_items(response.error_for_status()?.json_or_null()?))
    }
}

impl<'a> Deref for CourseFiles<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Uploaded documents filling a course file slot.
pub struct CourseAttachments<'a> {
    inner: Collection<'a>,
}

impl<'a> CourseAttachments<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            inner: Collection::new(client, "/course-attachments/"),
        }
    }

    pub async fn upload(
        &self,
        course_file: &str,
        academic_year: Option<&str>,
        file: FileUpload,
    ) -> Result<Value, ClientError> {
        let mut form = file.into_form("file").text("course_file", course_file);
        if let Some(year) = academic_year {
            form = form.text("academic_year", year);
        }
        self.client().send_multipart(self.path(), form).await
    }

    pub async fn download(
        &self,
        id: &str,
        academic_year: Option<&str>,
    ) -> Result<Bytes, ClientError> {
        let path = self.action_path(id, "download");
        let path = match academic_year {
            Some(year) => with_query(&path, &[("academic_year", year)]),
            None => path,
        };
        self.client().download(&path).await
    }
}

impl<'a> Deref for CourseAttachments<'a> {
    type Target = Collection<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

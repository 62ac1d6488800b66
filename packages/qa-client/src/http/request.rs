use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use crate::error::ClientError;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// One part of a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Bytes,
    },
}

impl MultipartPart {
    pub fn name(&self) -> &str {
        match self {
            MultipartPart::Text { name, .. } | MultipartPart::File { name, .. } => name,
        }
    }
}

/// Ordered multipart form. The transport picks the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime,
            bytes: bytes.into(),
        });
        self
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    pub fn into_reqwest(self) -> Result<reqwest::multipart::Form, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name, value),
                MultipartPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let mut file = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name);
                    if let Some(mime) = mime {
                        file = file
                            .mime_str(&mime)
                            .map_err(|e| ClientError::decode(format!("invalid mime '{mime}': {e}")))?;
                    }
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized JSON text
    Json(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// Caller-side options for one API call: verb, extra headers, body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach an already-serialized JSON body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Json(body.into());
        self
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_string(value)?);
        Ok(self)
    }

    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// Header set for an authenticated call.
///
/// The bearer token always wins over a caller-supplied `Authorization`.
/// Multipart bodies never carry a `Content-Type` here; everything else is
/// sent as JSON.
pub fn build_headers(access_token: &str, options: &RequestOptions) -> Vec<(String, String)> {
    let mut headers = vec![(AUTHORIZATION.to_string(), format!("Bearer {access_token}"))];
    headers.extend(
        options
            .headers
            .iter()
            .filter(|(name, _)| {
                !name.eq_ignore_ascii_case(AUTHORIZATION) && !name.eq_ignore_ascii_case(CONTENT_TYPE)
            })
            .cloned(),
    );
    if !options.body.is_multipart() {
        headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
    }
    headers
}

/// Fully resolved outbound call, as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.header(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_request_gets_bearer_and_content_type() {
        let options = RequestOptions::post()
            .with_json(&json!({"title": "Standard 1"}))
            .unwrap();
        let headers = build_headers("A1", &options);

        assert_eq!(
            headers,
            vec![
                ("Authorization".to_string(), "Bearer A1".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn bodyless_get_is_still_sent_as_json() {
        let headers = build_headers("A1", &RequestOptions::get());
        assert!(headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    }

    #[test]
    fn multipart_request_has_no_content_type() {
        let form = MultipartForm::new()
            .text("course_file", "42")
            .file("file", "syllabus.pdf", None, b"%PDF".to_vec());
        let options = RequestOptions::post()
            .with_header("content-type", "application/json")
            .with_multipart(form);

        let headers = build_headers("A1", &options);

        assert!(headers
            .iter()
            .all(|(k, _)| !k.eq_ignore_ascii_case("content-type")));
        assert!(headers.iter().any(|(k, v)| k == "Authorization" && v == "Bearer A1"));
    }

    #[test]
    fn caller_headers_are_kept_but_cannot_replace_bearer() {
        let options = RequestOptions::get()
            .with_header("Accept-Language", "ar")
            .with_header("authorization", "Bearer stolen");
        let headers = build_headers("A1", &options);

        let auth: Vec<_> = headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].1, "Bearer A1");
        assert!(headers.iter().any(|(k, v)| k == "Accept-Language" && v == "ar"));
    }

    #[test]
    fn api_request_header_lookup_is_case_insensitive() {
        let request = ApiRequest {
            method: Method::GET,
            url: "http://localhost/api/standards/".into(),
            headers: build_headers("A2", &RequestOptions::get()),
            body: RequestBody::Empty,
        };
        assert_eq!(request.header("authorization"), Some("Bearer A2"));
        assert_eq!(request.bearer_token(), Some("A2"));
    }

    #[test]
    fn multipart_form_converts_with_valid_mime() {
        let form = MultipartForm::new()
            .text("academic_year", "2024")
            .file("file", "a.pdf", Some("application/pdf".into()), b"x".to_vec());
        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.parts()[1].name(), "file");
        assert!(form.into_reqwest().is_ok());
    }

    #[test]
    fn multipart_form_rejects_bad_mime() {
        let form = MultipartForm::new().file("file", "a.bin", Some("not a mime".into()), b"x".to_vec());
        assert!(matches!(form.into_reqwest(), Err(ClientError::Decode { .. })));
    }
}

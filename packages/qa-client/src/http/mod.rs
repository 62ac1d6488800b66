//! Request/response types and the transport seam the client sends through.

pub mod request;
pub mod response;
pub mod transport;

pub use request::{build_headers, ApiRequest, MultipartForm, MultipartPart, RequestBody, RequestOptions};
pub use reqwest::Method;
pub use response::ApiResponse;
pub use transport::{HttpTransport, ReqwestTransport};

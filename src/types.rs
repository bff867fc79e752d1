//! Request and response data model shared by the dispatcher and its callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Parameter mapping for one call.
///
/// Reads send it as the query string; writes send it as the JSON body.
pub type Params = Map<String, Value>;

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// HTTP method of a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Put,
    Delete,
    Post,
}

impl Method {
    /// True when re-issuing the request cannot duplicate a side effect.
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post)
    }

    /// Whether parameters travel in the query string rather than the body.
    pub fn sends_query(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options | Self::Delete)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response envelope returned by `get`, `post`, `delete` and `upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status; `0` for cancelled calls.
    pub status: u16,
    /// Decoded body: JSON when parseable, otherwise the raw text.
    pub data: Value,
    /// True when the call was aborted through its cancellation handle.
    pub cancelled: bool,
    /// Rotated anti-forgery token found on the response, if any.
    pub csrf_token: Option<String>,
}

impl ApiResponse {
    /// Empty, successful-shaped result for an aborted call.
    pub fn cancelled() -> Self {
        Self {
            status: 0,
            data: Value::Object(Map::new()),
            cancelled: true,
            csrf_token: None,
        }
    }

    /// Decode the body into a typed payload.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// Binary response returned by `get_blob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResponse {
    pub status: u16,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub cancelled: bool,
}

impl BlobResponse {
    pub fn cancelled() -> Self {
        Self {
            status: 0,
            data: Vec::new(),
            content_type: None,
            cancelled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// One named binary payload for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

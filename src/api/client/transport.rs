//! One network attempt: request encoding, send, and raw response capture.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::links::query;
use crate::types::{Method, Params, UploadFile};

/// Response header carrying the rotated anti-forgery token.
pub const CSRF_RESPONSE_HEADER: &str = "x-csrf-token";
/// Multipart field holding the JSON-encoded non-file parameters.
pub const UPLOAD_PARAMS_FIELD: &str = "_params_";

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// How parameters travel for one call.
#[derive(Debug, Clone, Copy)]
pub(super) enum RequestBody<'a> {
    Query(&'a Params),
    Json(&'a Params),
    Multipart {
        files: &'a BTreeMap<String, UploadFile>,
        params: &'a Params,
    },
}

impl<'a> RequestBody<'a> {
    pub(super) fn for_method(method: Method, params: &'a Params) -> Self {
        if method.sends_query() {
            Self::Query(params)
        } else {
            Self::Json(params)
        }
    }
}

/// Status, headers and undecoded body of one response.
#[derive(Debug)]
pub(super) struct RawResponse {
    pub(super) status: u16,
    pub(super) headers: HeaderMap,
    pub(super) body: Vec<u8>,
}

impl RawResponse {
    pub(super) fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub(super) fn csrf_token(&self) -> Option<&str> {
        self.headers
            .get(CSRF_RESPONSE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub(super) fn content_type(&self) -> Option<String> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// JSON when the body parses, raw text otherwise, `null` when empty.
    pub(super) fn decoded_body(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned()))
    }

    pub(super) fn into_error(self) -> ApiError {
        let content_type = self.content_type();
        ApiError::status(
            self.status,
            String::from_utf8_lossy(&self.body).into_owned(),
            content_type,
        )
    }
}

/// Issue one attempt and capture the response, whatever its status.
pub(super) async fn send_once(
    http: &reqwest::Client,
    method: Method,
    url: &Url,
    body: RequestBody<'_>,
    headers: &[(&'static str, String)],
) -> Result<RawResponse, ApiError> {
    let mut url = url.clone();
    let mut request = match body {
        RequestBody::Query(params) => {
            append_query(&mut url, params);
            http.request(method.as_reqwest(), url)
        }
        RequestBody::Json(params) => http.request(method.as_reqwest(), url).json(params),
        RequestBody::Multipart { files, params } => http
            .request(method.as_reqwest(), url)
            .multipart(build_form(files, params)?),
    };
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

fn append_query(url: &mut Url, params: &Params) {
    if params.is_empty() {
        return;
    }
    let encoded = query::serialize(params.iter().map(|(key, value)| (key.as_str(), value)));
    let merged = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&merged));
}

/// Each file under its own field plus the JSON parameters under `_params_`.
pub(super) fn build_form(
    files: &BTreeMap<String, UploadFile>,
    params: &Params,
) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (field, file) in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = file.mime.as_deref() {
            part = part.mime_str(mime).map_err(|err| {
                ApiError::InvalidRequest(format!("invalid MIME type `{mime}` for `{field}`: {err}"))
            })?;
        }
        form = form.part(field.clone(), part);
    }
    let encoded = serde_json::to_string(params)
        .map_err(|err| ApiError::InvalidRequest(format!("unencodable upload params: {err}")))?;
    Ok(form.text(UPLOAD_PARAMS_FIELD, encoded))
}

//! Response shapes returned to business-entity services.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::RequestError;

/// Successful response with a decoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Non-2xx response. `data` holds the JSON body when it parses, the raw
/// text otherwise, and `Value::Null` when the body is empty.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub data: Value,
    pub headers: HeaderMap,
}

impl ErrorResponse {
    pub(crate) fn from_body(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
        let data = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
        };
        Self {
            status,
            data,
            headers,
        }
    }

    /// Best-effort human readable message from common API error bodies.
    pub fn message(&self) -> String {
        match &self.data {
            Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.data.to_string()),
            Value::String(text) if !text.is_empty() => text.clone(),
            _ => self
                .status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
    }
}

/// Outcome of a call that did not fail.
///
/// `PassThrough` carries a 401 response the session handler chose to hand
/// back to the caller instead of rejecting (public and invite flows).
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Success(ApiResponse<T>),
    PassThrough(ErrorResponse),
}

impl<T> Reply<T> {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Reply::PassThrough(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Success(response) => response.status,
            Reply::PassThrough(response) => response.status,
        }
    }

    /// Successful payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Reply::Success(response) => Some(&response.data),
            Reply::PassThrough(_) => None,
        }
    }

    /// Collapse into a `Result`, treating a passed-through response as a
    /// status error.
    pub fn into_result(self) -> Result<ApiResponse<T>, RequestError> {
        match self {
            Reply::Success(response) => Ok(response),
            Reply::PassThrough(response) => Err(RequestError::Status(response)),
        }
    }
}

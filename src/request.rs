//! Outbound request values: verbs, bodies and per-call options.

use mime::Mime;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use url::Url;

use crate::error::RequestError;

/// Header carrying the tenant id on every request.
pub const TENANT_HEADER: &str = "tenant-id";

/// Option keys accepted by [`RequestOptions::from_json`].
pub const OPTION_TENANT_ID: &str = "tenantId";
pub const OPTION_DIRECT_API: &str = "directAPI";
pub const OPTION_HEADERS: &str = "headers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// `POST`, `PUT` and `PATCH` carry bodies subject to tenancy injection.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single multipart form field.
#[derive(Debug, Clone)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
        content_type: Mime,
    },
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Binary {
        bytes: Vec<u8>,
        content_type: Mime,
    },
    Multipart(Vec<MultipartField>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, RequestError> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }

    pub fn binary(bytes: Vec<u8>, content_type: Mime) -> Self {
        RequestBody::Binary {
            bytes,
            content_type,
        }
    }

    /// Mutable access to a plain JSON object body. Binary, multipart,
    /// empty and non-object JSON bodies return `None`.
    pub fn as_object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            RequestBody::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn apply(self, builder: RequestBuilder) -> Result<RequestBuilder, RequestError> {
        match self {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(value) => Ok(builder.json(&value)),
            RequestBody::Binary {
                bytes,
                content_type,
            } => Ok(builder.header(CONTENT_TYPE, content_type.as_ref()).body(bytes)),
            RequestBody::Multipart(fields) => {
                let mut form = Form::new();
                for field in fields {
                    form = match field {
                        MultipartField::Text { name, value } => form.text(name, value),
                        MultipartField::File {
                            name,
                            file_name,
                            bytes,
                            content_type,
                        } => form.part(
                            name,
                            Part::bytes(bytes)
                                .file_name(file_name)
                                .mime_str(content_type.as_ref())?,
                        ),
                    };
                }
                Ok(builder.multipart(form))
            }
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<Option<Value>> for RequestBody {
    fn from(value: Option<Value>) -> Self {
        value.map(RequestBody::Json).unwrap_or_default()
    }
}

/// Recognized per-call options: `{ tenantId?, directAPI? = true, headers? }`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    tenant_id: Option<String>,
    direct_api: bool,
    headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            tenant_id: None,
            direct_api: true,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Options for a call that must go through the backend-for-frontend.
    pub fn local() -> Self {
        Self {
            direct_api: false,
            ..Self::default()
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn direct_api(&self) -> bool {
        self.direct_api
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Parse an option document such as `{"tenantId": "T1", "directAPI": false}`.
    ///
    /// Unknown keys are rejected. `null` values are treated as absent.
    pub fn from_json(value: &Value) -> Result<Self, RequestError> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            _ => return Err(RequestError::InvalidOption("options".to_string())),
        };

        let mut builder = Self::builder();
        for (key, value) in map {
            match (key.as_str(), value) {
                (OPTION_TENANT_ID | OPTION_DIRECT_API | OPTION_HEADERS, Value::Null) => {}
                (OPTION_TENANT_ID, Value::String(tenant)) => {
                    builder = builder.tenant_id(tenant.clone());
                }
                (OPTION_DIRECT_API, Value::Bool(direct)) => {
                    builder = builder.direct_api(*direct);
                }
                (OPTION_HEADERS, Value::Object(headers)) => {
                    for (name, value) in headers {
                        let value = value
                            .as_str()
                            .ok_or_else(|| RequestError::InvalidHeader { name: name.clone() })?;
                        builder = builder.header(name, value);
                    }
                }
                (OPTION_TENANT_ID | OPTION_DIRECT_API | OPTION_HEADERS, _) => {
                    return Err(RequestError::InvalidOption(key.clone()));
                }
                _ => return Err(RequestError::UnknownOption(key.clone())),
            }
        }
        builder.build()
    }
}

#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    tenant_id: Option<String>,
    direct_api: Option<bool>,
    headers: Vec<(String, String)>,
}

impl RequestOptionsBuilder {
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn direct_api(mut self, direct_api: bool) -> Self {
        self.direct_api = Some(direct_api);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<RequestOptions, RequestError> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RequestError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| RequestError::InvalidHeader { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }

        Ok(RequestOptions {
            tenant_id: self.tenant_id,
            direct_api: self.direct_api.unwrap_or(true),
            headers,
        })
    }
}

/// A fully resolved request, as seen by request interceptors.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl OutgoingRequest {
    /// Insert a header unless the caller already supplied one with that name.
    pub fn insert_header_if_absent(&mut self, name: HeaderName, value: &str) -> bool {
        if self.headers.contains_key(&name) {
            return false;
        }
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
                true
            }
            Err(_) => false,
        }
    }
}

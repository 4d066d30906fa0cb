//! HTTP client wrapper bound to one base URL.
//!
//! A `RequestClient` owns a `reqwest::Client`, the base URL it resolves paths
//! against, and its interceptor chains. The interceptor set is fixed when the
//! client is built; a builder silently drops a second interceptor with the
//! same name.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::HeaderName;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::RequestError;
use crate::interceptor::{
    RequestInterceptor, RequestInterceptorObject, ResponseDecision, ResponseInterceptor,
    ResponseInterceptorObject,
};
use crate::request::{Method, OutgoingRequest, RequestBody, RequestOptions, TENANT_HEADER};
use crate::response::{ApiResponse, ErrorResponse, Reply};
use crate::tenancy::TenancyInjector;

/// Timeout for ad-hoc clients.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const API_PATH_SEGMENT: &str = "api";

/// `{origin}/api`, leaving origins that already end in `/api` alone.
pub fn api_base_url(origin: &Url) -> Result<Url, RequestError> {
    let trimmed = origin.as_str().trim_end_matches('/');
    if trimmed.ends_with(&format!("/{}", API_PATH_SEGMENT)) {
        return Ok(Url::parse(trimmed)?);
    }
    Ok(Url::parse(&format!("{}/{}", trimmed, API_PATH_SEGMENT))?)
}

pub struct RequestClient {
    name: &'static str,
    http: reqwest::Client,
    base_url: RwLock<Url>,
    timeout: Duration,
    request_interceptors: Vec<RequestInterceptorObject>,
    response_interceptors: Vec<ResponseInterceptorObject>,
    tenancy: Option<TenancyInjector>,
}

impl RequestClient {
    pub fn builder(base_url: Url) -> RequestClientBuilder {
        RequestClientBuilder::new(base_url)
    }

    /// Client with the default 60 second timeout and no interceptors.
    pub fn new(base_url: Url) -> Result<Self, RequestError> {
        Self::builder(base_url).build()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> Url {
        self.base_url.read().clone()
    }

    /// Swap the base URL; requests already resolved keep the old one.
    pub fn set_base_url(&self, base_url: Url) {
        debug!("{} client base URL -> {}", self.name, base_url);
        *self.base_url.write() = base_url;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn injects_tenancy(&self) -> bool {
        self.tenancy.is_some()
    }

    pub fn request_interceptor_names(&self) -> Vec<&'static str> {
        self.request_interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn response_interceptor_names(&self) -> Vec<&'static str> {
        self.response_interceptors.iter().map(|i| i.name()).collect()
    }

    /// Resolve `path` against the base URL. Absolute URLs are used as given.
    pub fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        let base = self.base_url.read();
        Ok(Url::parse(&format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        self.request(Method::Get, path, RequestBody::Empty, options)
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        self.request(Method::Post, path, body.into(), options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        self.request(Method::Put, path, body.into(), options).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        self.request(Method::Patch, path, body.into(), options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        self.request(Method::Delete, path, RequestBody::Empty, options)
            .await
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        let request = self.prepare(method, path, body, options)?;
        self.execute(request, true).await
    }

    /// GET that skips the response interceptors, so an error status never
    /// reaches the session handler. Error responses come back as
    /// `RequestError::Status`.
    pub async fn lookup<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Reply<T>, RequestError> {
        let request = self.prepare(Method::Get, path, RequestBody::Empty, options)?;
        self.execute(request, false).await
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        mut body: RequestBody,
        options: &RequestOptions,
    ) -> Result<OutgoingRequest, RequestError> {
        if let Some(tenancy) = &self.tenancy {
            tenancy.apply(method, &mut body, options.tenant_id());
        }

        let mut request = OutgoingRequest {
            method,
            url: self.endpoint(path)?,
            headers: options.headers().clone(),
            body,
        };
        if let Some(tenant_id) = options.tenant_id() {
            request.insert_header_if_absent(HeaderName::from_static(TENANT_HEADER), tenant_id);
        }
        Ok(request)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: OutgoingRequest,
        intercept_errors: bool,
    ) -> Result<Reply<T>, RequestError> {
        for interceptor in &self.request_interceptors {
            interceptor.on_request(&mut request).await?;
        }

        debug!("{} {} via {} client", request.method, request.url, self.name);
        let builder = self
            .http
            .request(request.method.into(), request.url.clone())
            .headers(request.headers);
        let response = request.body.apply(builder)?.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        trace!("{} {} -> {}", request.method, request.url, status);

        if status.is_success() {
            let data = if body.is_empty() {
                serde_json::from_value(Value::Null)?
            } else {
                serde_json::from_slice(&body)?
            };
            return Ok(Reply::Success(ApiResponse {
                data,
                status,
                headers,
            }));
        }

        let error = ErrorResponse::from_body(status, headers, &body);
        if !intercept_errors {
            return Err(RequestError::Status(error));
        }
        for interceptor in &self.response_interceptors {
            if interceptor.on_error(&error).await == ResponseDecision::Resolve {
                return Ok(Reply::PassThrough(error));
            }
        }
        Err(RequestError::Status(error))
    }
}

pub struct RequestClientBuilder {
    name: &'static str,
    base_url: Url,
    timeout: Duration,
    request_interceptors: Vec<RequestInterceptorObject>,
    response_interceptors: Vec<ResponseInterceptorObject>,
    tenancy: Option<TenancyInjector>,
}

impl RequestClientBuilder {
    pub fn new(base_url: Url) -> Self {
        Self {
            name: "ad-hoc",
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            tenancy: None,
        }
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_request_interceptor<I>(mut self, interceptor: std::sync::Arc<I>) -> Self
    where
        I: RequestInterceptor + 'static,
    {
        if self
            .request_interceptors
            .iter()
            .any(|i| i.name() == interceptor.name())
        {
            debug!("Request interceptor {} already registered", interceptor.name());
            return self;
        }
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn with_response_interceptor<I>(mut self, interceptor: std::sync::Arc<I>) -> Self
    where
        I: ResponseInterceptor + 'static,
    {
        if self
            .response_interceptors
            .iter()
            .any(|i| i.name() == interceptor.name())
        {
            debug!("Response interceptor {} already registered", interceptor.name());
            return self;
        }
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn with_tenancy(mut self, tenancy: TenancyInjector) -> Self {
        self.tenancy = Some(tenancy);
        self
    }

    pub fn build(self) -> Result<RequestClient, RequestError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        debug!(
            "Built {} client for {} (timeout {:?})",
            self.name, self.base_url, self.timeout
        );

        Ok(RequestClient {
            name: self.name,
            http,
            base_url: RwLock::new(self.base_url),
            timeout: self.timeout,
            request_interceptors: self.request_interceptors,
            response_interceptors: self.response_interceptors,
            tenancy: self.tenancy,
        })
    }
}

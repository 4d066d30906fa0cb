//! Per-call choice between the direct and local clients.
//!
//! A call goes to the direct client when a direct client exists (a server
//! address is configured or, in desktop mode, was resolved) and the call did
//! not opt out with `directAPI: false`. Everything else goes to the local
//! client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use strum::Display;
use tracing::debug;

use crate::client::RequestClient;
use crate::configuration::Configuration;
use crate::credentials::CredentialStore;
use crate::error::RequestError;
use crate::registry::{ClientFactory, ClientRegistry};
use crate::request::{Method, RequestBody, RequestOptions};
use crate::response::Reply;
use crate::session::{LocationProvider, Navigator, PathExemptionPolicy, UnauthorizedHandler};

pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    Local,
    Direct,
}

pub struct Router {
    registry: Arc<ClientRegistry>,
}

impl Router {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Wire a router with the path exemption policy from `configuration`.
    pub fn from_configuration(
        configuration: Configuration,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        let policy = PathExemptionPolicy::new(
            configuration.languages().to_vec(),
            configuration.redirect_path(),
        );
        let unauthorized = Arc::new(UnauthorizedHandler::new(
            Arc::new(policy),
            navigator,
            location,
        ));
        let factory = ClientFactory::new(configuration, credentials, unauthorized);
        Self::new(Arc::new(ClientRegistry::new(factory)))
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    pub fn unauthorized(&self) -> &Arc<UnauthorizedHandler> {
        self.registry.factory().unauthorized()
    }

    /// Pick the client that will send a call made with `options`.
    pub async fn client_for(
        &self,
        options: &RequestOptions,
    ) -> Result<(Target, Arc<RequestClient>), RequestError> {
        if options.direct_api() {
            if let Some(direct) = self.registry.direct().await? {
                return Ok((Target::Direct, direct));
            }
            debug!("No direct client available, falling back to local");
        }
        Ok((Target::Local, self.registry.local().await?))
    }

    pub async fn target_for(&self, options: &RequestOptions) -> Result<Target, RequestError> {
        Ok(self.client_for(options).await?.0)
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
        let (target, client) = self.client_for(options).await?;
        debug!("Routing {} {} to {} client", method, path, target);
        client.request(method, path, body, options).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Only ever called explicitly; the 401 handler does not refresh.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Reply<Value>, RequestError> {
        self.post(
            REFRESH_TOKEN_PATH,
            json!({ "refresh_token": refresh_token }),
            &RequestOptions::default(),
        )
        .await
    }
}

//! Construction and caching of the `local` and `direct` request clients.
//!
//! Each client is built at most once per registry, even when the first calls
//! race: construction runs inside a `tokio::sync::OnceCell`, so concurrent
//! callers wait on the same in-flight build.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use crate::client::{api_base_url, RequestClient};
use crate::configuration::Configuration;
use crate::credentials::CredentialStore;
use crate::desktop::DesktopServerResolver;
use crate::error::RequestError;
use crate::interceptor::{AuthHeaderInterceptor, BearerSource};
use crate::session::UnauthorizedHandler;
use crate::tenancy::TenancyInjector;

pub const LOCAL_CLIENT_NAME: &str = "local";
pub const DIRECT_CLIENT_NAME: &str = "direct";

/// Builds fully wired request clients from configuration and shared dependencies.
pub struct ClientFactory {
    configuration: Configuration,
    credentials: Arc<dyn CredentialStore>,
    unauthorized: Arc<UnauthorizedHandler>,
    builds: AtomicUsize,
}

impl ClientFactory {
    pub fn new(
        configuration: Configuration,
        credentials: Arc<dyn CredentialStore>,
        unauthorized: Arc<UnauthorizedHandler>,
    ) -> Self {
        Self {
            configuration,
            credentials,
            unauthorized,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn unauthorized(&self) -> &Arc<UnauthorizedHandler> {
        &self.unauthorized
    }

    /// Number of clients this factory has built.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.configuration.timeout_secs())
    }

    /// Client for the backend-for-frontend. It never injects tenancy into
    /// bodies; the backend-for-frontend does that itself.
    pub fn build_local(&self) -> Result<RequestClient, RequestError> {
        let bearer = if self.configuration.legacy_team_bearer() {
            BearerSource::ActiveTeam
        } else {
            BearerSource::AccessToken
        };

        let client = RequestClient::builder(api_base_url(self.configuration.local_api_url())?)
            .name(LOCAL_CLIENT_NAME)
            .timeout(self.timeout())
            .with_request_interceptor(Arc::new(AuthHeaderInterceptor::new(
                self.credentials.clone(),
                bearer,
            )))
            .with_response_interceptor(self.unauthorized.clone())
            .build()?;
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(client)
    }

    /// Client for the remote API at `{server}/api`.
    pub fn build_direct(&self, server: &Url) -> Result<RequestClient, RequestError> {
        let client = RequestClient::builder(api_base_url(server)?)
            .name(DIRECT_CLIENT_NAME)
            .timeout(self.timeout())
            .with_request_interceptor(Arc::new(AuthHeaderInterceptor::new(
                self.credentials.clone(),
                BearerSource::AccessToken,
            )))
            .with_response_interceptor(self.unauthorized.clone())
            .with_tenancy(TenancyInjector::new(self.credentials.clone()))
            .build()?;
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(client)
    }
}

/// Process-wide holder of the two client singletons.
pub struct ClientRegistry {
    factory: ClientFactory,
    local: OnceCell<Arc<RequestClient>>,
    direct: OnceCell<Option<Arc<RequestClient>>>,
    pending_server: Mutex<Option<Url>>,
}

impl ClientRegistry {
    pub fn new(factory: ClientFactory) -> Self {
        Self {
            factory,
            local: OnceCell::new(),
            direct: OnceCell::new(),
            pending_server: Mutex::new(None),
        }
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    /// The local client, built on first use.
    pub async fn local(&self) -> Result<Arc<RequestClient>, RequestError> {
        let client = self
            .local
            .get_or_try_init(|| async {
                debug!("Constructing local client");
                self.factory.build_local().map(Arc::new)
            })
            .await?;
        Ok(client.clone())
    }

    /// The direct client, or `None` when no server address is available.
    ///
    /// In desktop mode the address is fetched from the local backend once,
    /// before the client is built.
    pub async fn direct(&self) -> Result<Option<Arc<RequestClient>>, RequestError> {
        let client = self
            .direct
            .get_or_try_init(|| self.build_direct())
            .await?;
        Ok(client.clone())
    }

    async fn build_direct(&self) -> Result<Option<Arc<RequestClient>>, RequestError> {
        let Some(server) = self.resolve_server().await? else {
            info!("No API server configured, direct calls go through the local client");
            return Ok(None);
        };
        debug!("Constructing direct client for {}", server);
        let client = Arc::new(self.factory.build_direct(&server)?);
        self.clear_pending_server(&server);
        Ok(Some(client))
    }

    /// The pending override stays recorded until a client built from it exists.
    async fn resolve_server(&self) -> Result<Option<Url>, RequestError> {
        let pending = self.pending_server.lock().clone();
        if let Some(server) = pending {
            return Ok(Some(server));
        }

        let configured = self.factory.configuration.server_url().cloned();
        if !self.factory.configuration.desktop() {
            return Ok(configured);
        }

        let local = self.local().await?;
        Ok(DesktopServerResolver::new(configured).resolve(&local).await)
    }

    fn clear_pending_server(&self, used: &Url) {
        let mut pending = self.pending_server.lock();
        if pending.as_ref() == Some(used) {
            *pending = None;
        }
    }

    /// Point direct calls at another server.
    ///
    /// Swaps the base URL of an existing direct client; otherwise the address
    /// is used when the direct client is first built. Returns `true` when an
    /// existing client was updated.
    pub fn override_server(&self, server: &Url) -> Result<bool, RequestError> {
        match self.direct.get() {
            Some(Some(client)) => {
                client.set_base_url(api_base_url(server)?);
                Ok(true)
            }
            Some(None) => {
                debug!("Direct client resolved to none, override ignored until restart");
                Ok(false)
            }
            None => {
                *self.pending_server.lock() = Some(server.clone());
                Ok(false)
            }
        }
    }
}

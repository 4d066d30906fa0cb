//! Request and response interceptor seams.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION};
use tracing::trace;

use crate::credentials::CredentialStore;
use crate::error::RequestError;
use crate::request::{OutgoingRequest, TENANT_HEADER};
use crate::response::ErrorResponse;

pub type RequestInterceptorObject = Arc<dyn RequestInterceptor>;
pub type ResponseInterceptorObject = Arc<dyn ResponseInterceptor>;

/// Runs on every outgoing request after caller headers are applied.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Registration key; a client holds at most one interceptor per name.
    fn name(&self) -> &'static str;

    async fn on_request(&self, request: &mut OutgoingRequest) -> Result<(), RequestError>;
}

/// What a response interceptor wants done with an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDecision {
    /// Surface the error to the caller.
    Reject,
    /// Hand the error response back as a value.
    Resolve,
}

/// Runs on every non-2xx response.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_error(&self, response: &ErrorResponse) -> ResponseDecision;
}

/// Which credential becomes the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerSource {
    AccessToken,
    /// Compatibility mode for backends-for-frontend that expect the active team id.
    ActiveTeam,
}

/// Adds `Authorization: Bearer <token>` and `tenant-id` from the credential store.
/// Headers the caller set explicitly are never overwritten.
pub struct AuthHeaderInterceptor {
    credentials: Arc<dyn CredentialStore>,
    bearer: BearerSource,
}

impl AuthHeaderInterceptor {
    pub fn new(credentials: Arc<dyn CredentialStore>, bearer: BearerSource) -> Self {
        Self {
            credentials,
            bearer,
        }
    }
}

#[async_trait]
impl RequestInterceptor for AuthHeaderInterceptor {
    fn name(&self) -> &'static str {
        "auth-headers"
    }

    async fn on_request(&self, request: &mut OutgoingRequest) -> Result<(), RequestError> {
        // One snapshot per request, so the bearer and tenant come from the same sign-in.
        let context = self.credentials.auth_context();
        let token = match self.bearer {
            BearerSource::AccessToken => context.access_token,
            BearerSource::ActiveTeam => context.active_team_id,
        };

        if let Some(token) = token {
            if request.insert_header_if_absent(AUTHORIZATION, &format!("Bearer {}", token)) {
                trace!("Attached {:?} bearer to {}", self.bearer, request.url);
            }
        }

        if let Some(tenant_id) = context.tenant_id {
            request.insert_header_if_absent(HeaderName::from_static(TENANT_HEADER), &tenant_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialKey, MemoryCredentialStore};
    use crate::request::{Method, RequestBody};
    use reqwest::header::{HeaderMap, HeaderValue};
    use url::Url;

    fn request() -> OutgoingRequest {
        OutgoingRequest {
            method: Method::Get,
            url: Url::parse("http://localhost:3030/api/tasks").unwrap(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    fn store() -> Arc<MemoryCredentialStore> {
        Arc::new(
            MemoryCredentialStore::new()
                .with(CredentialKey::AccessToken, "tok")
                .with(CredentialKey::TenantId, "T1")
                .with(CredentialKey::ActiveTeamId, "team-7"),
        )
    }

    #[tokio::test]
    async fn test_attaches_access_token_and_tenant() {
        let interceptor = AuthHeaderInterceptor::new(store(), BearerSource::AccessToken);
        let mut request = request();
        interceptor.on_request(&mut request).await.unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(request.headers.get(TENANT_HEADER).unwrap(), "T1");
    }

    #[tokio::test]
    async fn test_active_team_bearer() {
        let interceptor = AuthHeaderInterceptor::new(store(), BearerSource::ActiveTeam);
        let mut request = request();
        interceptor.on_request(&mut request).await.unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer team-7");
    }

    #[tokio::test]
    async fn test_keeps_caller_headers() {
        let interceptor = AuthHeaderInterceptor::new(store(), BearerSource::AccessToken);
        let mut request = request();
        request
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        request
            .headers
            .insert(TENANT_HEADER, HeaderValue::from_static("T2"));
        interceptor.on_request(&mut request).await.unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer caller");
        assert_eq!(request.headers.get(TENANT_HEADER).unwrap(), "T2");
    }

    #[tokio::test]
    async fn test_empty_store_adds_nothing() {
        let interceptor = AuthHeaderInterceptor::new(
            Arc::new(MemoryCredentialStore::new()),
            BearerSource::AccessToken,
        );
        let mut request = request();
        interceptor.on_request(&mut request).await.unwrap();
        assert!(request.headers.is_empty());
    }

    /// Serves everything from one context; single-key reads see nothing.
    struct SnapshotStore;

    impl CredentialStore for SnapshotStore {
        fn get(&self, _key: CredentialKey) -> Option<String> {
            None
        }

        fn auth_context(&self) -> crate::credentials::AuthContext {
            crate::credentials::AuthContext {
                access_token: Some("snap-tok".to_string()),
                tenant_id: Some("T-snap".to_string()),
                organization_id: None,
                active_team_id: None,
            }
        }
    }

    #[tokio::test]
    async fn test_headers_come_from_one_auth_context() {
        let interceptor =
            AuthHeaderInterceptor::new(Arc::new(SnapshotStore), BearerSource::AccessToken);
        let mut request = request();
        interceptor.on_request(&mut request).await.unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer snap-tok");
        assert_eq!(request.headers.get(TENANT_HEADER).unwrap(), "T-snap");
    }
}

//! Shared wiring for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use teams_gateway::{
    configuration::Configuration,
    credentials::{CredentialKey, MemoryCredentialStore},
    router::Router,
    session::{Navigator, StaticLocation},
};
use url::Url;

/// Navigator that records every redirect instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().push(path.to_string());
    }
}

pub struct Harness {
    pub router: Router,
    pub credentials: Arc<MemoryCredentialStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub location: Arc<StaticLocation>,
}

pub fn url(value: &str) -> Url {
    Url::parse(value).unwrap()
}

pub fn signed_in_store() -> MemoryCredentialStore {
    MemoryCredentialStore::new()
        .with(CredentialKey::AccessToken, "tok")
        .with(CredentialKey::RefreshToken, "refresh-1")
        .with(CredentialKey::TenantId, "T1")
        .with(CredentialKey::OrganizationId, "O1")
        .with(CredentialKey::ActiveTeamId, "team-7")
}

pub fn harness(configuration: Configuration) -> Harness {
    harness_with_store(configuration, signed_in_store())
}

pub fn harness_with_store(configuration: Configuration, store: MemoryCredentialStore) -> Harness {
    let credentials = Arc::new(store);
    let navigator = Arc::new(RecordingNavigator::default());
    let location = Arc::new(StaticLocation::new("/"));
    let router = Router::from_configuration(
        configuration,
        credentials.clone(),
        navigator.clone(),
        location.clone(),
    );
    Harness {
        router,
        credentials,
        navigator,
        location,
    }
}

/// Configuration with both the local and the direct side pointing at mock servers.
pub fn configuration(local: &str, server: Option<&str>) -> Configuration {
    Configuration::default()
        .with_local_api_url(url(local))
        .with_server_url(server.map(url))
}

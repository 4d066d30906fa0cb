//! Runtime server address for the desktop deployment mode.
//!
//! The desktop shell lets the user point the app at any API server, so the
//! address is asked from the local backend instead of read from configuration.

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::client::RequestClient;
use crate::request::RequestOptions;
use crate::response::Reply;

pub const DESKTOP_SERVER_PATH: &str = "/desktop-server";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopServer {
    pub server_url: String,
}

/// Resolves the remote server address, falling back to the configured one.
#[derive(Debug, Clone)]
pub struct DesktopServerResolver {
    fallback: Option<Url>,
}

impl DesktopServerResolver {
    pub fn new(fallback: Option<Url>) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Option<&Url> {
        self.fallback.as_ref()
    }

    /// Ask the local backend for the server address. Any failure, including a
    /// malformed or empty answer, yields the fallback; no error escapes.
    pub async fn resolve(&self, local: &RequestClient) -> Option<Url> {
        // A 401 here must not expire the session, so skip the response interceptors.
        let reply = local
            .lookup::<DesktopServer>(DESKTOP_SERVER_PATH, &RequestOptions::local())
            .await;

        let server_url = match reply {
            Ok(Reply::Success(response)) => response.data.server_url,
            Ok(Reply::PassThrough(response)) => {
                warn!(
                    "Desktop server lookup answered {}, using fallback",
                    response.status
                );
                return self.fallback.clone();
            }
            Err(e) => {
                warn!("Desktop server lookup failed, using fallback: {}", e);
                return self.fallback.clone();
            }
        };

        if server_url.trim().is_empty() {
            warn!("Desktop server lookup returned no address, using fallback");
            return self.fallback.clone();
        }

        match Url::parse(server_url.trim()) {
            Ok(url) => {
                info!("Using desktop server {}", url);
                Some(url)
            }
            Err(e) => {
                warn!(
                    "Desktop server address {:?} is invalid ({}), using fallback",
                    server_url, e
                );
                self.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_server_payload() {
        let payload: DesktopServer =
            serde_json::from_str(r#"{"serverUrl":"https://api.example.com"}"#).unwrap();
        assert_eq!(payload.server_url, "https://api.example.com");
    }

    #[tokio::test]
    async fn test_unreachable_backend_uses_fallback() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let local = RequestClient::new(Url::parse("http://127.0.0.1:9/api").unwrap()).unwrap();
        let fallback = Url::parse("https://static.example.com").unwrap();
        let resolver = DesktopServerResolver::new(Some(fallback.clone()));
        assert_eq!(resolver.resolve(&local).await, Some(fallback));
    }
}

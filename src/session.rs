//! Session-expiry handling for HTTP 401 responses.
//!
//! A 401 from either client moves the session from `Authenticated` to
//! `Expired`. What happens next depends on the page the user is on: public
//! invite and team pages get the response back, everything else is sent to
//! the configured entry path.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::interceptor::{ResponseDecision, ResponseInterceptor};
use crate::response::ErrorResponse;

const JOIN_SEGMENT: &str = "join";
const TEAM_SEGMENT: &str = "team";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Expired,
}

/// What to do with an expired session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Navigate to the given path, discarding the session.
    Redirect(String),
    /// Return the 401 response to the caller.
    PassThrough,
}

/// Decides how an expired session is handled for the current page.
pub trait SessionExpiredNotifier: Send + Sync {
    fn on_session_expired(&self, current_path: &str) -> SessionAction;
}

/// Performs the navigation side effect of [`SessionAction::Redirect`].
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Source of the path the user is currently on.
pub trait LocationProvider: Send + Sync {
    fn current_path(&self) -> String;
}

/// Path-based exemption policy.
///
/// Exempt: any path containing a `join` segment, paths starting with `team`,
/// and `/<language>/team/...` for a recognized language code.
#[derive(Debug, Clone)]
pub struct PathExemptionPolicy {
    languages: Vec<String>,
    redirect_path: String,
}

impl PathExemptionPolicy {
    pub fn new(languages: Vec<String>, redirect_path: impl Into<String>) -> Self {
        Self {
            languages,
            redirect_path: redirect_path.into(),
        }
    }

    pub fn is_exempt(&self, current_path: &str) -> bool {
        let path = current_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if segments.contains(&JOIN_SEGMENT) {
            return true;
        }

        match segments.as_slice() {
            [first, ..] if *first == TEAM_SEGMENT => true,
            [language, second, ..] if *second == TEAM_SEGMENT => {
                self.languages.iter().any(|l| l == language)
            }
            _ => false,
        }
    }
}

impl SessionExpiredNotifier for PathExemptionPolicy {
    fn on_session_expired(&self, current_path: &str) -> SessionAction {
        if self.is_exempt(current_path) {
            SessionAction::PassThrough
        } else {
            SessionAction::Redirect(self.redirect_path.clone())
        }
    }
}

/// Navigator for environments without a browser: records the decision in the log.
#[derive(Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        warn!("Session expired, sign in again at {}", path);
    }
}

/// Location set explicitly by the embedding application.
#[derive(Debug, Default)]
pub struct StaticLocation {
    path: RwLock<String>,
}

impl StaticLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: RwLock::new(path.into()),
        }
    }

    pub fn set(&self, path: impl Into<String>) {
        *self.path.write() = path.into();
    }
}

impl LocationProvider for StaticLocation {
    fn current_path(&self) -> String {
        self.path.read().clone()
    }
}

/// Response interceptor shared by the local and direct clients.
pub struct UnauthorizedHandler {
    notifier: Arc<dyn SessionExpiredNotifier>,
    navigator: Arc<dyn Navigator>,
    location: Arc<dyn LocationProvider>,
    state: Mutex<SessionState>,
}

impl UnauthorizedHandler {
    pub fn new(
        notifier: Arc<dyn SessionExpiredNotifier>,
        navigator: Arc<dyn Navigator>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            notifier,
            navigator,
            location,
            state: Mutex::new(SessionState::Authenticated),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Return to `Authenticated`, e.g. after a fresh sign-in.
    pub fn mark_authenticated(&self) {
        *self.state.lock() = SessionState::Authenticated;
    }

    /// Record the expiry and decide; performs the redirect when one is chosen.
    pub fn handle_unauthorized(&self) -> SessionAction {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Authenticated {
                debug!("Session state: Authenticated -> Expired");
            }
            *state = SessionState::Expired;
        }

        let current_path = self.location.current_path();
        let action = self.notifier.on_session_expired(&current_path);
        match &action {
            SessionAction::Redirect(target) => {
                info!("Redirecting from {} to {} after 401", current_path, target);
                self.navigator.navigate(target);
            }
            SessionAction::PassThrough => {
                debug!("401 on exempt path {}, passing response through", current_path);
            }
        }
        action
    }
}

#[async_trait]
impl ResponseInterceptor for UnauthorizedHandler {
    fn name(&self) -> &'static str {
        "unauthorized"
    }

    async fn on_error(&self, response: &ErrorResponse) -> ResponseDecision {
        if response.status != StatusCode::UNAUTHORIZED {
            return ResponseDecision::Reject;
        }
        match self.handle_unauthorized() {
            SessionAction::Redirect(_) => ResponseDecision::Reject,
            SessionAction::PassThrough => ResponseDecision::Resolve,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn policy() -> PathExemptionPolicy {
        PathExemptionPolicy::new(
            vec!["en".to_string(), "fr".to_string()],
            "/auth/passcode",
        )
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().push(path.to_string());
        }
    }

    #[test]
    fn test_exempt_paths() {
        let policy = policy();
        assert!(policy.is_exempt("/team/abc"));
        assert!(policy.is_exempt("/en/team/abc"));
        assert!(policy.is_exempt("/auth/join/xyz"));
        assert!(policy.is_exempt("/join"));
        assert!(policy.is_exempt("team"));
        assert!(policy.is_exempt("/team/abc?tab=members"));
    }

    #[test]
    fn test_non_exempt_paths() {
        let policy = policy();
        assert!(!policy.is_exempt("/settings"));
        assert!(!policy.is_exempt("/"));
        assert!(!policy.is_exempt(""));
        assert!(!policy.is_exempt("/xx/team/abc"));
        assert!(!policy.is_exempt("/settings/team"));
        assert!(!policy.is_exempt("/joined"));
    }

    #[test]
    fn test_policy_actions() {
        let policy = policy();
        assert_eq!(policy.on_session_expired("/team/abc"), SessionAction::PassThrough);
        assert_eq!(
            policy.on_session_expired("/settings"),
            SessionAction::Redirect("/auth/passcode".to_string())
        );
    }

    fn handler(path: &str) -> (UnauthorizedHandler, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let handler = UnauthorizedHandler::new(
            Arc::new(policy()),
            navigator.clone(),
            Arc::new(StaticLocation::new(path)),
        );
        (handler, navigator)
    }

    fn response(status: StatusCode) -> ErrorResponse {
        ErrorResponse {
            status,
            data: serde_json::Value::Null,
            headers: HeaderMap::new(),
        }
    }

    #[tokio::test]
    async fn test_redirects_once_on_regular_path() {
        let (handler, navigator) = handler("/settings");
        assert_eq!(handler.state(), SessionState::Authenticated);

        let decision = handler.on_error(&response(StatusCode::UNAUTHORIZED)).await;
        assert_eq!(decision, ResponseDecision::Reject);
        assert_eq!(*navigator.visits.lock(), vec!["/auth/passcode".to_string()]);
        assert_eq!(handler.state(), SessionState::Expired);

        handler.mark_authenticated();
        assert_eq!(handler.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_passes_through_on_exempt_path() {
        let (handler, navigator) = handler("/en/team/abc");
        let decision = handler.on_error(&response(StatusCode::UNAUTHORIZED)).await;
        assert_eq!(decision, ResponseDecision::Resolve);
        assert!(navigator.visits.lock().is_empty());
        assert_eq!(handler.state(), SessionState::Expired);
    }

    #[tokio::test]
    async fn test_ignores_other_statuses() {
        let (handler, navigator) = handler("/settings");
        let decision = handler.on_error(&response(StatusCode::FORBIDDEN)).await;
        assert_eq!(decision, ResponseDecision::Reject);
        assert!(navigator.visits.lock().is_empty());
        assert_eq!(handler.state(), SessionState::Authenticated);
    }
}

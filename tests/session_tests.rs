//! 401 handling against mock servers, with and without exempt paths.

mod common;

use common::{configuration, harness};
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use teams_gateway::{
    error::RequestError,
    request::RequestOptions,
    response::Reply,
    session::SessionState,
};

fn unauthorized(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/tasks");
        then.status(401).json_body(json!({ "message": "Unauthorized" }));
    })
}

#[tokio::test]
async fn test_unauthorized_on_team_page_passes_through() {
    let local = MockServer::start_async().await;
    let direct = MockServer::start_async().await;
    let mock = unauthorized(&direct);

    let h = harness(configuration(&local.base_url(), Some(&direct.base_url())));
    h.location.set("/team/abc");

    let reply = h
        .router
        .get::<Value>("/tasks", &RequestOptions::default())
        .await
        .unwrap();
    mock.assert();

    match reply {
        Reply::PassThrough(response) => {
            assert_eq!(response.status, 401);
            assert_eq!(response.data, json!({ "message": "Unauthorized" }));
        }
        Reply::Success(_) => panic!("expected pass-through"),
    }
    assert!(h.navigator.visits().is_empty());
    assert_eq!(h.router.unauthorized().state(), SessionState::Expired);
}

#[tokio::test]
async fn test_unauthorized_on_localized_team_page_passes_through() {
    let local = MockServer::start_async().await;
    let direct = MockServer::start_async().await;
    unauthorized(&direct);

    let h = harness(configuration(&local.base_url(), Some(&direct.base_url())));
    h.location.set("/en/team/abc");

    let reply = h
        .router
        .get::<Value>("/tasks", &RequestOptions::default())
        .await
        .unwrap();
    assert!(reply.is_pass_through());
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_unauthorized_on_join_link_passes_through_local_client() {
    let local = MockServer::start_async().await;
    let mock = unauthorized(&local);

    let h = harness(configuration(&local.base_url(), None));
    h.location.set("/fr/join/invite-1?ref=mail");

    let reply = h
        .router
        .get::<Value>("/tasks", &RequestOptions::local())
        .await
        .unwrap();
    mock.assert();
    assert!(reply.is_pass_through());
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_unauthorized_elsewhere_redirects_once_and_rejects() {
    let local = MockServer::start_async().await;
    let direct = MockServer::start_async().await;
    let mock = unauthorized(&direct);

    let h = harness(configuration(&local.base_url(), Some(&direct.base_url())));
    h.location.set("/settings");

    let error = h
        .router
        .get::<Value>("/tasks", &RequestOptions::default())
        .await
        .unwrap_err();
    mock.assert();

    assert!(error.is_unauthorized());
    assert!(matches!(error, RequestError::Status(ref response) if response.status == 401));
    assert_eq!(h.navigator.visits(), vec!["/auth/passcode".to_string()]);
    assert_eq!(h.router.unauthorized().state(), SessionState::Expired);
}

#[tokio::test]
async fn test_sign_in_resets_session_state() {
    let local = MockServer::start_async().await;
    unauthorized(&local);

    let h = harness(configuration(&local.base_url(), None));
    h.location.set("/dashboard");

    let _ = h
        .router
        .get::<Value>("/tasks", &RequestOptions::default())
        .await;
    assert_eq!(h.router.unauthorized().state(), SessionState::Expired);

    h.router.unauthorized().mark_authenticated();
    assert_eq!(h.router.unauthorized().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_other_errors_leave_session_alone() {
    let local = MockServer::start_async().await;
    local.mock(|when, then| {
        when.method(GET).path("/api/tasks");
        then.status(403).json_body(json!({ "message": "Forbidden" }));
    });

    let h = harness(configuration(&local.base_url(), None));
    h.location.set("/settings");

    let error = h
        .router
        .get::<Value>("/tasks", &RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
    assert!(h.navigator.visits().is_empty());
    assert_eq!(h.router.unauthorized().state(), SessionState::Authenticated);
}

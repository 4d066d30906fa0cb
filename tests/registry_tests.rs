//! Single construction of the clients and desktop server resolution.

mod common;

use std::sync::Arc;

use common::{configuration, harness, url};
use futures::future::join_all;
use httpmock::prelude::*;
use serde_json::{json, Value};
use teams_gateway::{
    request::RequestOptions, response::Reply, router::Target, session::SessionState,
};

#[tokio::test]
async fn test_concurrent_first_calls_share_one_local_client() {
    let h = harness(configuration("http://localhost:3030", None));
    let registry = h.router.registry();

    let clients = join_all((0..16).map(|_| registry.local())).await;
    let clients: Vec<_> = clients.into_iter().map(Result::unwrap).collect();

    for client in &clients[1..] {
        assert!(Arc::ptr_eq(&clients[0], client));
    }
    assert_eq!(registry.factory().builds(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_tasks_share_one_direct_client() {
    let h = harness(configuration(
        "http://localhost:3030",
        Some("https://api.example.com"),
    ));
    let registry = h.router.registry().clone();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.direct().await })
        })
        .collect();

    let mut clients = Vec::new();
    for task in tasks {
        clients.push(task.await.unwrap().unwrap().unwrap());
    }
    for client in &clients[1..] {
        assert!(Arc::ptr_eq(&clients[0], client));
    }
    assert_eq!(registry.factory().builds(), 1);
    assert_eq!(
        clients[0].base_url().as_str(),
        "https://api.example.com/api"
    );
}

#[tokio::test]
async fn test_desktop_mode_resolves_server_once() {
    let local = MockServer::start_async().await;
    let remote = MockServer::start_async().await;
    let lookup = local.mock(|when, then| {
        when.method(GET).path("/api/desktop-server");
        then.status(200)
            .json_body(json!({ "serverUrl": remote.base_url() }));
    });
    let tasks = remote.mock(|when, then| {
        when.method(GET)
            .path("/api/tasks")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(json!({ "via": "desktop" }));
    });

    let h = harness(
        configuration(&local.base_url(), Some("http://127.0.0.1:9")).with_desktop(true),
    );
    let options = RequestOptions::default();
    let targets = join_all((0..8).map(|_| h.router.target_for(&options))).await;
    for target in targets {
        assert_eq!(target.unwrap(), Target::Direct);
    }

    let reply = h.router.get::<Value>("/tasks", &options).await.unwrap();
    lookup.assert();
    tasks.assert();
    assert!(matches!(reply, Reply::Success(ref r) if r.data == json!({ "via": "desktop" })));
    // One local client for the lookup, one direct client.
    assert_eq!(h.router.registry().factory().builds(), 2);
}

#[tokio::test]
async fn test_desktop_lookup_failure_falls_back_to_configured_server() {
    let local = MockServer::start_async().await;
    local.mock(|when, then| {
        when.method(GET).path("/api/desktop-server");
        then.status(500).body("boom");
    });

    let h = harness(
        configuration(&local.base_url(), Some("https://fallback.example.com")).with_desktop(true),
    );
    let direct = h.router.registry().direct().await.unwrap().unwrap();
    assert_eq!(direct.base_url().as_str(), "https://fallback.example.com/api");
}

#[tokio::test]
async fn test_unauthorized_desktop_lookup_falls_back_without_expiring_session() {
    let local = MockServer::start_async().await;
    let lookup = local.mock(|when, then| {
        when.method(GET).path("/api/desktop-server");
        then.status(401).json_body(json!({ "message": "Unauthorized" }));
    });

    let h = harness(
        configuration(&local.base_url(), Some("https://fallback.example.com")).with_desktop(true),
    );
    h.location.set("/settings");

    let direct = h.router.registry().direct().await.unwrap().unwrap();
    lookup.assert();
    assert_eq!(direct.base_url().as_str(), "https://fallback.example.com/api");
    assert!(h.navigator.visits().is_empty());
    assert_eq!(h.router.unauthorized().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_unreachable_desktop_backend_falls_back_without_error() {
    let h = harness(
        configuration("http://127.0.0.1:9", Some("https://fallback.example.com"))
            .with_desktop(true),
    );
    let direct = h.router.registry().direct().await.unwrap().unwrap();
    assert_eq!(direct.base_url().as_str(), "https://fallback.example.com/api");
}

#[tokio::test]
async fn test_desktop_lookup_without_fallback_routes_local() {
    let local = MockServer::start_async().await;
    local.mock(|when, then| {
        when.method(GET).path("/api/desktop-server");
        then.status(200).json_body(json!({ "serverUrl": "" }));
    });

    let h = harness(configuration(&local.base_url(), None).with_desktop(true));
    assert_eq!(
        h.router.target_for(&RequestOptions::default()).await.unwrap(),
        Target::Local
    );
}

#[tokio::test]
async fn test_override_before_first_use_is_picked_up() {
    let h = harness(configuration(
        "http://localhost:3030",
        Some("https://api.example.com"),
    ));
    let registry = h.router.registry();

    assert!(!registry
        .override_server(&url("https://other.example.com"))
        .unwrap());
    let direct = registry.direct().await.unwrap().unwrap();
    assert_eq!(direct.base_url().as_str(), "https://other.example.com/api");
}

#[tokio::test]
async fn test_override_swaps_existing_client_base_url() {
    let h = harness(configuration(
        "http://localhost:3030",
        Some("https://api.example.com"),
    ));
    let registry = h.router.registry();
    let before = registry.direct().await.unwrap().unwrap();

    assert!(registry
        .override_server(&url("https://other.example.com"))
        .unwrap());
    let after = registry.direct().await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.base_url().as_str(), "https://other.example.com/api");
    assert_eq!(registry.factory().builds(), 1);
}

//! # Engine Integration Tests
//!
//! Drives full reconciliations (secret resolution, provider dispatch and
//! REST calls) against a wiremock server standing in for the git host.

mod common;

use common::{init_rustls, spec, MemorySecretStore, CALLBACK_URL};
use githook_controller::error::GitHookError;
use githook_controller::hook::{Engine, ObservedState, OptionBuilder, ReconcileOutcome};
use githook_controller::provider::HttpClientFactory;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GITHUB_HOOKS: &str = "/api/v3/repos/acme/widgets/hooks";
const GOGS_HOOKS: &str = "/api/v1/repos/acme/widgets/hooks";

fn engine(store: Arc<MemorySecretStore>) -> Engine {
    init_rustls();
    Engine::new(
        OptionBuilder::new(CALLBACK_URL),
        store,
        Arc::new(HttpClientFactory::with_client(reqwest::Client::new())),
    )
}

fn github_hook(id: u64, events: &[&str]) -> serde_json::Value {
    json!({ "id": id, "events": events, "config": { "url": CALLBACK_URL } })
}

#[tokio::test]
async fn test_first_reconcile_creates_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GITHUB_HOOKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GITHUB_HOOKS))
        .and(body_partial_json(json!({ "events": ["push"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(github_hook(77, &["push"])))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let outcome = engine
        .reconcile("ci", &spec(&server.uri(), "GitHub", &[]), &ObservedState::default())
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Created("77".to_string()));
    assert_eq!(
        outcome.observed(&ObservedState::default()),
        ObservedState::with_hook_id("77")
    );
}

#[tokio::test]
async fn test_reconcile_in_sync_makes_no_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{GITHUB_HOOKS}/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_hook(77, &["push"])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let desired = spec(&server.uri(), "github", &["push"]);
    let observed = ObservedState::with_hook_id("77");

    for _ in 0..2 {
        let outcome = engine.reconcile("ci", &desired, &observed).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(outcome.observed(&observed), observed);
    }
}

#[tokio::test]
async fn test_event_change_updates_recorded_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{GITHUB_HOOKS}/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_hook(77, &["push"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{GITHUB_HOOKS}/77")))
        .and(body_partial_json(json!({ "events": ["push", "pull_request"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(github_hook(77, &["push", "pull_request"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let outcome = engine
        .reconcile(
            "ci",
            &spec(&server.uri(), "github", &["push", "pull_request"]),
            &ObservedState::with_hook_id("77"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Updated("77".to_string()));
}

#[tokio::test]
async fn test_hook_found_by_url_is_adopted_on_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOGS_HOOKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 31,
            "events": ["push"],
            "config": { "url": CALLBACK_URL }
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{GOGS_HOOKS}/31")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 31,
            "events": ["push", "issues"],
            "config": { "url": CALLBACK_URL }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let outcome = engine
        .reconcile(
            "ci",
            &spec(&server.uri(), "gogs", &["push", "issues"]),
            &ObservedState::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Updated("31".to_string()));
}

#[tokio::test]
async fn test_missing_secret_makes_no_remote_call() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySecretStore::default());
    let engine = engine(Arc::clone(&store));
    let err = engine
        .reconcile("ci", &spec(&server.uri(), "github", &[]), &ObservedState::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GitHookError::SecretNotFound { ref name, .. } if name == "git-creds"));
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_missing_key_makes_no_remote_call() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySecretStore::default().insert(
        "ci",
        "git-creds",
        &[("token", "token-123")],
    ));
    let engine = engine(store);
    let err = engine
        .reconcile("ci", &spec(&server.uri(), "github", &[]), &ObservedState::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GitHookError::KeyNotFound { ref key, .. } if key == "webhook-secret"));
}

#[tokio::test]
async fn test_unsupported_provider_makes_no_remote_call() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let err = engine
        .reconcile("ci", &spec(&server.uri(), "bitbucket", &[]), &ObservedState::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "git provider bitbucket not supported");
}

#[tokio::test]
async fn test_recorded_hook_deleted_remotely_is_not_recreated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{GITHUB_HOOKS}/77")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(Arc::new(MemorySecretStore::with_credentials()));
    let err = engine
        .reconcile(
            "ci",
            &spec(&server.uri(), "github", &["push"]),
            &ObservedState::with_hook_id("77"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GitHookError::ProviderApi {
            status: Some(404),
            ..
        }
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GITHUB_HOOKS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    init_rustls();
    let engine = Engine::new(
        OptionBuilder::new(CALLBACK_URL),
        Arc::new(MemorySecretStore::with_credentials()),
        Arc::new(HttpClientFactory::new(Duration::from_millis(200)).unwrap()),
    );
    let err = engine
        .reconcile("ci", &spec(&server.uri(), "github", &["push"]), &ObservedState::default())
        .await
        .unwrap_err();

    match &err {
        GitHookError::ProviderApi {
            status, message, ..
        } => {
            assert_eq!(*status, None);
            assert_eq!(message, "request timed out");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_transient());
}

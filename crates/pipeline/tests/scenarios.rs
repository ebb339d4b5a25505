//! End-to-end scenario tests (S1-S6) driving the assembled chain against an
//! in-memory store and a stub upstream, per SPEC_FULL.md's test tooling.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use warden_auth::AuthManager;
use warden_core::{
    ApiDefinition, ApiSpec, OauthConfig, ProxyConfig, SessionState, VersionDefinition,
    VersionDefinitionLocation, VersionInfo,
};
use warden_pipeline::{build_chain, chain_router, PipelineState};
use warden_state::{key::session_key, SessionStore};
use warden_state_memory::MemoryStore;

async fn spawn_stub_upstream() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/{*rest}", any(|| async { "upstream-ok" }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn empty_session(rate: f64, per: f64, allowance: f64) -> SessionState {
    SessionState {
        last_check: Utc::now().timestamp(),
        allowance,
        rate,
        per,
        expires: 0,
        quota_max: -1,
        quota_remaining: 0,
        quota_renews: 0,
        quota_renewal_rate: 0,
        access_rights: Default::default(),
        org_id: "org-1".into(),
    }
}

fn base_definition(target_url: String, not_versioned: bool, version: VersionInfo) -> ApiDefinition {
    let mut versions = BTreeMap::new();
    versions.insert(version.name.clone(), version);
    ApiDefinition {
        api_id: "api-1".into(),
        org_id: "org-1".into(),
        name: "Example".into(),
        active: true,
        use_oauth2: false,
        oauth_meta: OauthConfig::default(),
        version_definition: VersionDefinition {
            location: VersionDefinitionLocation::Header,
            key: "X-Api-Version".into(),
        },
        not_versioned,
        versions,
        proxy: ProxyConfig {
            listen_path: "/listen".into(),
            target_url,
            strip_listen_path: true,
        },
        auth_header_name: "Authorization".into(),
    }
}

async fn test_server(definition: ApiDefinition, store: Arc<MemoryStore>) -> TestServer {
    let spec = Arc::new(ApiSpec::compile(definition).unwrap());
    let auth = Arc::new(AuthManager::new(store.clone()));
    let analytics = Arc::new(warden_analytics::MemorySink::new());
    let state = PipelineState::new(spec, auth, analytics, false, reqwest::Client::new());
    let router = chain_router(build_chain(state));
    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn s1_admits_then_rate_limits_three_rapid_requests() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    store
        .set_key(&session_key("k1"), &serde_json::to_string(&empty_session(2.0, 10.0, 2.0)).unwrap(), 0)
        .await
        .unwrap();

    let definition = base_definition(
        format!("http://{upstream}"),
        true,
        VersionInfo { name: "v1".into(), ..Default::default() },
    );
    let server = test_server(definition, store).await;

    let first = server.get("/listen/x").add_header("Authorization", "k1").await;
    let second = server.get("/listen/x").add_header("Authorization", "k1").await;
    let third = server.get("/listen/x").add_header("Authorization", "k1").await;

    first.assert_status_ok();
    second.assert_status_ok();
    third.assert_status(axum::http::StatusCode::FORBIDDEN);
    third.assert_text_contains("Key rate limit exceeded");
}

#[tokio::test]
async fn s2_quota_renews_after_renewal_time_passes() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now().timestamp();
    let mut session = empty_session(100.0, 1.0, 100.0);
    session.quota_max = 1;
    session.quota_remaining = 0;
    session.quota_renews = now - 1;
    session.quota_renewal_rate = 60;
    store
        .set_key(&session_key("k2"), &serde_json::to_string(&session).unwrap(), 0)
        .await
        .unwrap();

    let definition = base_definition(
        format!("http://{upstream}"),
        true,
        VersionInfo { name: "v1".into(), ..Default::default() },
    );
    let server = test_server(definition, store.clone()).await;

    let response = server.get("/listen/x").add_header("Authorization", "k2").await;
    response.assert_status_ok();

    let raw = store.get_key(&session_key("k2")).await.unwrap().unwrap();
    let persisted: SessionState = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.quota_remaining, 1);
    assert_eq!(persisted.quota_renews, now + 60);
}

#[tokio::test]
async fn s3_ignored_path_bypasses_auth() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    let definition = base_definition(
        format!("http://{upstream}"),
        true,
        VersionInfo {
            name: "v1".into(),
            ignored: vec!["/public/{any}".into()],
            ..Default::default()
        },
    );
    let server = test_server(definition, store).await;

    let response = server.get("/listen/public/x").await;
    response.assert_status_ok();
    response.assert_text("upstream-ok");
}

#[tokio::test]
async fn s4_whitelist_excludes_other_paths() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    let definition = base_definition(
        format!("http://{upstream}"),
        true,
        VersionInfo {
            name: "v1".into(),
            whitelist: vec!["/allowed".into()],
            ..Default::default()
        },
    );
    let server = test_server(definition, store).await;

    let response = server.get("/listen/other").await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    response.assert_text_contains("Requested endpoint is forbidden");
}

#[tokio::test]
async fn s5_expired_version_is_rejected() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    let definition = base_definition(
        format!("http://{upstream}"),
        false,
        VersionInfo {
            name: "v1".into(),
            expires: "2000-01-01 00:00".into(),
            ..Default::default()
        },
    );
    let server = test_server(definition, store).await;

    let response = server.get("/listen/x").add_header("X-Api-Version", "v1").await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    response.assert_text_contains("Api Version has expired");
}

#[tokio::test]
async fn s6_oauth_bearer_admits_and_rejects_malformed_scheme() {
    let upstream = spawn_stub_upstream().await;
    let store = Arc::new(MemoryStore::new());
    store
        .set_key(&session_key("aabbcc"), &serde_json::to_string(&empty_session(10.0, 1.0, 10.0)).unwrap(), 0)
        .await
        .unwrap();

    let mut definition = base_definition(
        format!("http://{upstream}"),
        true,
        VersionInfo { name: "v1".into(), ..Default::default() },
    );
    definition.use_oauth2 = true;
    let server = test_server(definition, store).await;

    let admitted = server.get("/listen/x").add_header("Authorization", "Bearer aabbcc").await;
    admitted.assert_status_ok();

    let malformed = server.get("/listen/x").add_header("Authorization", "Basic aabbcc").await;
    malformed.assert_status(axum::http::StatusCode::BAD_REQUEST);
    malformed.assert_text_contains("Bearer token malformed");
}

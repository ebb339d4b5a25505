//! Concrete admin HTTP handlers (§4.8, §6). Mounted under `/warden` by
//! `WardenTableBuilder`, behind `AdminGuardLayer`.

use std::sync::{Arc, OnceLock};

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use warden_auth::AuthManager;
use warden_core::SessionState;
use warden_router::{reload, GatewayRouter, TableBuilder};
use warden_state::key::oauth_key;

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "status": "error", "message": message }))).into_response()
}

fn server_error(message: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "message": message }))).into_response()
}

/// Shared state for the admin router. `router_handle` is filled in once the
/// `GatewayRouter` exists (after the first table build in `main.rs`) so the
/// reload handler can trigger a swap on itself.
#[derive(Clone)]
pub struct AdminState {
    pub auth: Arc<AuthManager>,
    pub table_builder: Arc<dyn TableBuilder>,
    pub router_handle: Arc<OnceLock<GatewayRouter>>,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/warden/keys/create", post(create_key))
        .route("/warden/keys/{name}", post(upsert_key).put(upsert_key))
        .route("/warden/keys/{name}", get(get_key))
        .route("/warden/keys/{name}", delete(delete_key))
        .route("/warden/keys/", get(list_keys))
        .route("/warden/oauth/clients/create", post(create_oauth_client))
        .route("/warden/reload", get(reload_handler))
        .route("/warden/health", get(health))
        .with_state(state)
}

async fn create_key(State(state): State<AdminState>, Json(session): Json<SessionState>) -> Response {
    let key = format!("{}{}", session.org_id, uuid::Uuid::new_v4().simple());
    match state.auth.update_session(&key, &session).await {
        Ok(()) => Json(json!({ "key": key, "status": "ok", "action": "create" })).into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

async fn upsert_key(State(state): State<AdminState>, method: Method, Path(name): Path<String>, Json(session): Json<SessionState>) -> Response {
    let action = if method == Method::POST { "added" } else { "modified" };
    match state.auth.update_session(&name, &session).await {
        Ok(()) => Json(json!({ "key": name, "status": "ok", "action": action })).into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

async fn get_key(State(state): State<AdminState>, Path(name): Path<String>) -> Response {
    match state.auth.get_session_detail(&name).await {
        Some(session) => Json(session).into_response(),
        None => not_found("Key not found"),
    }
}

#[derive(Deserialize)]
struct ListFilter {
    #[serde(default)]
    filter: String,
}

async fn list_keys(State(state): State<AdminState>, Query(filter): Query<ListFilter>) -> Response {
    match state.auth.get_sessions(&filter.filter).await {
        Ok(keys) => Json(json!({ "api_keys": keys })).into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

async fn delete_key(State(state): State<AdminState>, Path(name): Path<String>) -> Response {
    match state.auth.delete_session(&name).await {
        Ok(_) => Json(json!({ "key": name, "status": "ok", "action": "deleted" })).into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

#[derive(Deserialize)]
struct CreateOauthClient {
    redirect_uri: String,
    api_id: String,
}

async fn create_oauth_client(State(state): State<AdminState>, Json(body): Json<CreateOauthClient>) -> Response {
    let client_id = uuid::Uuid::new_v4().simple().to_string();
    let client_secret = uuid::Uuid::new_v4().simple().to_string();
    let record = json!({
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": body.redirect_uri,
        "api_id": body.api_id,
    });
    let key = oauth_key(&body.api_id, "client", &client_id);
    let Ok(raw) = serde_json::to_string(&record) else {
        return server_error("failed to serialize OAuth2 client record");
    };
    match state.auth.store_raw(&key, &raw).await {
        Ok(()) => Json(json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": body.redirect_uri,
        }))
        .into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

async fn reload_handler(State(state): State<AdminState>) -> Response {
    let Some(router) = state.router_handle.get() else {
        return server_error("router not yet initialized");
    };
    match reload(router, state.table_builder.as_ref()).await {
        Ok(()) => Json(json!({ "status": "ok", "message": "" })).into_response(),
        Err(err) => server_error(&err.to_string()),
    }
}

async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

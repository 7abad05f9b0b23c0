//! HTTP server assembly for Wassup.
//!
//! Combines the command endpoint from `wassup-api` with the cookie session
//! routes, behind a request-tracing layer.

pub mod error;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wassup_api::Dispatcher;
use wassup_core::store::SupStore;
use wassup_store_file::DEFAULT_DB_FILE_NAME;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WASSUP_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "localhost".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_DB_FILE_NAME) }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(dispatcher: Arc<Dispatcher<S>>) -> Router
where
  S: SupStore + 'static,
{
  Router::new()
    .route("/logged_in", post(session::logged_in::<S>))
    .route("/logout", post(session::logout))
    .with_state(dispatcher.clone())
    .merge(wassup_api::api_router(dispatcher))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use wassup_core::store::MemoryStore;

  fn app() -> (Arc<Dispatcher<MemoryStore>>, Router) {
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(MemoryStore::new())));
    (dispatcher.clone(), router(dispatcher))
  }

  async fn login(app: Router, form: &str) -> axum::response::Response {
    let req = Request::builder()
      .method("POST")
      .uri("/logged_in")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(form.to_string()))
      .unwrap();
    app.oneshot(req).await.unwrap()
  }

  #[test]
  fn config_defaults() {
    let cfg: ServerConfig = serde_json::from_value(json!({})).unwrap();
    assert_eq!(cfg.host, "localhost");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("wassup_app_db.json"));
  }

  #[tokio::test]
  async fn login_registers_user_and_sets_cookie() {
    let (dispatcher, app) = app();
    let resp = login(app, "user_id=alice&full_name=Alice+Liddell").await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
    assert_eq!(resp.headers()[header::SET_COOKIE], "user_id=alice; Path=/");

    let db = dispatcher.store().load().await.unwrap();
    assert_eq!(db.user("alice").unwrap().full_name(), "Alice Liddell");
  }

  #[tokio::test]
  async fn login_keeps_existing_name() {
    let (dispatcher, app) = app();
    login(app.clone(), "user_id=alice&full_name=Alice").await;
    login(app, "user_id=alice&full_name=Mallory").await;

    let db = dispatcher.store().load().await.unwrap();
    assert_eq!(db.user("alice").unwrap().full_name(), "Alice");
  }

  #[tokio::test]
  async fn login_requires_both_fields() {
    let (dispatcher, app) = app();
    let resp = login(app, "user_id=alice").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(dispatcher.store().save_count(), 0);
  }

  #[tokio::test]
  async fn logout_clears_cookie() {
    let (_, app) = app();
    let req = Request::builder()
      .method("POST")
      .uri("/logout")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/login");
    assert_eq!(resp.headers()[header::SET_COOKIE], "user_id=; Path=/; Max-Age=0");
  }

  #[tokio::test]
  async fn cookie_from_login_drives_post() {
    let (_, app) = app();
    login(app.clone(), "user_id=alice&full_name=Alice").await;

    let body = json!({
      "protocol_version": "1.3",
      "message_id":       "m",
      "command":          "user_exists",
      "command_data":     { "user_id": "alice" },
    });
    let req = Request::builder()
      .method("POST")
      .uri("/post")
      .header(header::COOKIE, "user_id=alice")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["reply_data"], json!({ "user_id": "alice", "exists": true, "full_name": "Alice" }));
  }
}

//! The Wassup JSON command endpoint.
//!
//! Exposes an axum [`Router`] with a single `POST /post` route backed by any
//! [`wassup_core::store::SupStore`]. Login pages, static assets, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(wassup_api::api_router(dispatcher.clone()))
//! ```

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod identity;

use std::sync::Arc;

use axum::{
  Json, Router,
  body::Bytes,
  extract::State,
  http::HeaderMap,
  response::{IntoResponse, Redirect, Response},
  routing::post,
};
use wassup_core::store::SupStore;

pub use dispatch::{Dispatcher, Outcome};
pub use error::DispatchError;

/// Where clients without an identity are sent.
pub const LOGIN_PATH: &str = "/login";

/// Build the command router for `dispatcher`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(dispatcher: Arc<Dispatcher<S>>) -> Router<()>
where
  S: SupStore + 'static,
{
  Router::new()
    .route("/post", post(post_handler::<S>))
    .with_state(dispatcher)
}

/// `POST /post` with a request envelope as the body.
///
/// Always answers with a response envelope, except when no identity is
/// available, in which case it redirects to [`LOGIN_PATH`].
pub async fn post_handler<S>(
  State(dispatcher): State<Arc<Dispatcher<S>>>,
  headers: HeaderMap,
  body: Bytes,
) -> Response
where
  S: SupStore + 'static,
{
  let session = identity::session_user(&headers);
  match dispatcher.dispatch(&body, session).await {
    Outcome::Reply(reply) => Json(reply).into_response(),
    Outcome::LoginRequired => Redirect::to(LOGIN_PATH).into_response(),
  }
}

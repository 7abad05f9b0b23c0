//! Cookie session routes: logging in registers the user and sets the
//! `user_id` cookie that `POST /post` reads; logging out clears it.

use std::sync::Arc;

use axum::{
  Form,
  extract::State,
  http::header,
  response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use wassup_api::{Dispatcher, LOGIN_PATH, identity::SESSION_COOKIE};
use wassup_core::{UserId, store::SupStore};

use crate::error::Error;

/// Form posted by the login page.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub user_id:   String,
  #[serde(default)]
  pub full_name: String,
}

/// Characters that cannot appear in a bare cookie value.
fn valid_cookie_value(s: &str) -> bool {
  s.chars()
    .all(|c| c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\'))
}

/// `POST /logged_in` with form fields `user_id` and `full_name`.
///
/// Registers the user if the id is new (an existing user keeps their name),
/// sets the session cookie, and redirects to `/`.
pub async fn logged_in<S>(
  State(dispatcher): State<Arc<Dispatcher<S>>>,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error>
where
  S: SupStore + 'static,
{
  if form.user_id.is_empty() || form.full_name.is_empty() {
    return Err(Error::BadRequest("Invalid or missing user ID and name".into()));
  }
  if !valid_cookie_value(&form.user_id) {
    return Err(Error::BadRequest(
      "User ID may only contain printable characters without spaces, quotes, commas, or semicolons"
        .into(),
    ));
  }

  let user_id = UserId::from(form.user_id);
  {
    let _guard = dispatcher.exclusive().await;
    let store = dispatcher.store();
    let mut db = store.load().await.map_err(|e| Error::Store(Box::new(e)))?;
    if db.create_user(user_id.clone(), form.full_name) {
      tracing::info!(%user_id, "registered user at login");
    }
    store.save(&db).await.map_err(|e| Error::Store(Box::new(e)))?;
  }

  let cookie = format!("{SESSION_COOKIE}={user_id}; Path=/");
  Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// `POST /logout`: clears the session cookie and redirects to the login page.
pub async fn logout() -> Response {
  let cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
  ([(header::SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH)).into_response()
}

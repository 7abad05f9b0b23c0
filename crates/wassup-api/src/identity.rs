//! Reading the acting user from the session cookie.

use axum::http::{HeaderMap, header};
use wassup_core::UserId;

/// Name of the cookie that carries the logged-in user's id.
pub const SESSION_COOKIE: &str = "user_id";

/// The user id stored in the session cookie, if any. An empty value counts as
/// no session.
pub fn session_user(headers: &HeaderMap) -> Option<UserId> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim_matches('"'))
    .filter(|value| !value.is_empty())
    .map(UserId::from)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(cookies: &[&str]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for c in cookies {
      map.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
    }
    map
  }

  #[test]
  fn finds_cookie_among_others() {
    let h = headers(&["theme=dark; user_id=alice; lang=en"]);
    assert_eq!(session_user(&h), Some(UserId::from("alice")));
  }

  #[test]
  fn finds_cookie_in_second_header() {
    let h = headers(&["theme=dark", "user_id=\"bob\""]);
    assert_eq!(session_user(&h), Some(UserId::from("bob")));
  }

  #[test]
  fn empty_or_absent_cookie_is_no_session() {
    assert_eq!(session_user(&headers(&[])), None);
    assert_eq!(session_user(&headers(&["user_id="])), None);
    assert_eq!(session_user(&headers(&["other_user_id=alice"])), None);
  }
}

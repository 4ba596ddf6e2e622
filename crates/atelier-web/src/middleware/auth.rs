//! Session authentication middleware
//!
//! Gates the admin pages behind a valid `session_token` cookie.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::server::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Username of the logged-in admin, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

/// Session gate middleware
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.get_session(cookie.value()).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(AuthUser(session.username));
            next.run(request).await
        }
        None => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            debug!("No valid session for {}, redirecting to login", target);
            Redirect::to(&login_redirect(target)).into_response()
        }
    }
}

/// Login URL that returns to `target` afterwards
pub fn login_redirect(target: &str) -> String {
    format!("/login?redirect_to={}", urlencoding::encode(target))
}

/// Only same-site absolute paths are accepted as post-login targets
pub fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t,
        _ => "/edit",
    }
}

/// Cookie issued on successful login
pub fn session_cookie(token: String, max_age: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Cookie that clears the session on the client
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_target() {
        assert_eq!(login_redirect("/edit"), "/login?redirect_to=%2Fedit");
        assert_eq!(
            login_redirect("/orders?tab=open"),
            "/login?redirect_to=%2Forders%3Ftab%3Dopen"
        );
    }

    #[test]
    fn test_safe_redirect_target() {
        assert_eq!(safe_redirect_target(Some("/orders")), "/orders");
        assert_eq!(safe_redirect_target(None), "/edit");
        assert_eq!(safe_redirect_target(Some("")), "/edit");
        assert_eq!(safe_redirect_target(Some("https://example.com")), "/edit");
        assert_eq!(safe_redirect_target(Some("//example.com")), "/edit");
        assert_eq!(safe_redirect_target(Some("/\\example.com")), "/edit");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), chrono::Duration::hours(24));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_removal_cookie_matches_session_cookie_attributes() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}

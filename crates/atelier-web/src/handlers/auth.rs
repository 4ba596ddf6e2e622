//! Admin login and logout

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::middleware::auth::{SESSION_COOKIE, removal_cookie, safe_redirect_target, session_cookie};
use crate::render::PageContext;
use crate::server::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub redirect_to: Option<String>,
}

pub async fn show_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    ctx: PageContext,
) -> Result<Response> {
    ctx.render(&state, views::login(query.redirect_to.as_deref())).await
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if !state.config.admin.verify(&form.username, &form.password) {
        warn!("Failed login attempt for user {:?}", form.username);
        return Ok(Html(views::login_error()).into_response());
    }

    let token = state.sessions.create_session(&form.username).await?;
    let jar = jar.add(session_cookie(token, state.sessions.ttl()));
    let target = safe_redirect_target(form.redirect_to.as_deref()).to_string();

    info!("User {} logged in", form.username);
    Ok((StatusCode::OK, jar, [("HX-Redirect", target)]).into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.delete_session(cookie.value()).await;
        info!("Session logged out");
    }

    (jar.remove(removal_cookie()), Redirect::to("/"))
}

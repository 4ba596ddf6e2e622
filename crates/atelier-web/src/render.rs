//! Page rendering
//!
//! HTMX requests (`HX-Request: true`) receive only the page fragment.
//! Regular navigations receive the fragment wrapped in the site layout.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use atelier_core::StoredText;

use crate::cart_cookie::get_cart;
use crate::error::Result;
use crate::server::AppState;
use crate::views;

/// An entry of the site navigation. Names of the form `ref:<id>` are
/// replaced by the current stored text with that reference id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRoute {
    pub path: &'static str,
    pub name: String,
    pub in_sidebar: bool,
}

const NAV_ROUTES: &[(&str, &str, bool)] = &[
    ("/", "ref:home_title", false),
    ("/gallery", "ref:gallery_title", true),
    ("/prints", "ref:prints_title", true),
    ("/buyart", "ref:buy_art_title", true),
    ("/about", "ref:about_me_title", true),
];

/// Navigation with stored-text names resolved
pub fn nav_routes(texts: &[StoredText]) -> Vec<NavRoute> {
    NAV_ROUTES
        .iter()
        .map(|&(path, name, in_sidebar)| {
            let resolved = name
                .strip_prefix("ref:")
                .and_then(|id| texts.iter().find(|t| t.reference_id == id))
                .map(|t| t.content.clone())
                .unwrap_or_else(|| name.to_string());
            NavRoute {
                path,
                name: resolved,
                in_sidebar,
            }
        })
        .collect()
}

/// Per-request rendering context
#[derive(Debug, Clone)]
pub struct PageContext {
    pub htmx: bool,
    pub path: String,
    pub cart_count: i64,
}

impl<S: Send + Sync> FromRequestParts<S> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let htmx = parts
            .headers
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");
        let jar = CookieJar::from_headers(&parts.headers);

        Ok(Self {
            htmx,
            path: parts.uri.path().to_string(),
            cart_count: get_cart(&jar).total_quantity(),
        })
    }
}

impl PageContext {
    /// Theme event sent to the client with every page
    pub fn theme_trigger(&self) -> &'static str {
        if self.path == "/" {
            "pageThemeDark"
        } else {
            "pageThemeLight"
        }
    }

    /// Render `content` as a page, using `cart_count` for the badge
    pub async fn render_with_count(
        &self,
        state: &AppState,
        content: String,
        cart_count: i64,
    ) -> Result<Response> {
        let body = if self.htmx {
            content
        } else {
            let texts = state.db.latest_texts().await.unwrap_or_else(|e| {
                warn!("Failed to load navigation texts: {}", e);
                Vec::new()
            });
            views::layout(&nav_routes(&texts), &self.path, cart_count, &content)
        };

        Ok(([("HX-Trigger", self.theme_trigger())], Html(body)).into_response())
    }

    pub async fn render(&self, state: &AppState, content: String) -> Result<Response> {
        self.render_with_count(state, content, self.cart_count).await
    }
}

//! Public pages

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use super::stored_text;
use crate::error::{Result, WebError};
use crate::render::PageContext;
use crate::server::AppState;
use crate::views;

/// Artworks per gallery page
pub const GALLERY_PAGE_SIZE: i64 = 8;

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub page: Option<String>,
}

/// Page number from the query string; anything below 1 or unparseable is 1
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let title = stored_text(&state, "home_title").await?;
    ctx.render(&state, views::home(&title)).await
}

pub async fn gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
    ctx: PageContext,
) -> Result<Response> {
    let page = parse_page(query.page.as_deref());
    let offset = (page - 1).saturating_mul(GALLERY_PAGE_SIZE);

    let arts = state.db.list_arts_paged(GALLERY_PAGE_SIZE, offset).await?;
    let has_more = arts.len() as i64 == GALLERY_PAGE_SIZE;
    debug!("Gallery page {} with {} arts", page, arts.len());

    if page > 1 {
        return Ok(Html(views::gallery_items(&arts, page, has_more)).into_response());
    }

    let title = stored_text(&state, "gallery_title").await?;
    ctx.render(&state, views::gallery(&title, &arts, page, has_more)).await
}

pub async fn gallery_single(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: PageContext,
) -> Result<Response> {
    let art = state
        .db
        .get_art(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("art {}", id)))?;

    ctx.render(&state, views::art_detail(&art)).await
}

pub async fn prints(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let title = stored_text(&state, "prints_title").await?;
    let text = stored_text(&state, "prints_text").await?;
    let prints = state.db.list_store_prints().await?;

    ctx.render(&state, views::prints_page(&title, &text, &prints)).await
}

pub async fn buy_art(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let title = stored_text(&state, "buy_art_title").await?;
    let text = stored_text(&state, "buy_art_text").await?;
    ctx.render(&state, views::text_page(&title, &text)).await
}

pub async fn about(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let title = stored_text(&state, "about_me_title").await?;
    let text = stored_text(&state, "about_me_text").await?;
    ctx.render(&state, views::text_page(&title, &text)).await
}

/// Empties the modal container
pub async fn close_modal() -> Html<&'static str> {
    Html("")
}

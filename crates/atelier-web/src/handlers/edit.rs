//! Admin editor for artworks, prints and page text

use std::collections::HashMap;

use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::{debug, info};

use atelier_core::db::{ArtPatch, NewArt, NewPrint, PrintPatch, parse_form_bool};

use crate::error::{Result, WebError};
use crate::middleware::auth::AuthUser;
use crate::render::PageContext;
use crate::server::AppState;
use crate::views;

/// Tells HTMX to navigate back to the editor
fn redirect_to_edit() -> Response {
    [("HX-Redirect", "/edit")].into_response()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    non_empty(value).and_then(|v| v.trim().parse().ok())
}

async fn edit_page_content(state: &AppState) -> Result<String> {
    let arts = state.db.list_arts().await?;
    let texts = state.db.latest_texts().await?;
    let prints = state.db.list_prints().await?;
    Ok(views::edit_page(&arts, &texts, &prints))
}

pub async fn edit(
    State(state): State<AppState>,
    axum::Extension(AuthUser(username)): axum::Extension<AuthUser>,
    ctx: PageContext,
) -> Result<Response> {
    debug!("Editor opened by {}", username);
    let content = edit_page_content(&state).await?;
    ctx.render(&state, content).await
}

pub async fn reset_order(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let arts = state.db.reset_art_ordering().await?;
    info!("Reset ordering of {} arts", arts.len());

    let content = edit_page_content(&state).await?;
    ctx.render(&state, content).await
}

pub async fn new_art_modal() -> Html<String> {
    Html(views::art_modal(None))
}

pub async fn edit_art_modal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let art = state
        .db
        .get_art(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("art {}", id)))?;
    Ok(Html(views::art_modal(Some(&art))))
}

/// Art fields as posted by the editor forms
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArtForm {
    pub title: Option<String>,
    pub img_url: Option<String>,
    pub thumb_url: Option<String>,
    pub medium: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
    pub sold: Option<String>,
}

impl ArtForm {
    fn into_new_art(self) -> NewArt {
        NewArt {
            title: self.title.unwrap_or_default(),
            img_url: self.img_url.unwrap_or_default(),
            thumb_url: self.thumb_url.unwrap_or_default(),
            medium: self.medium.unwrap_or_default(),
            width: parse_number(self.width).unwrap_or_default(),
            height: parse_number(self.height).unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            sold: self.sold.as_deref().is_some_and(parse_form_bool),
            ordering: 0.0,
        }
    }

    /// Only fields with a non-empty value end up in the patch
    fn into_patch(self) -> ArtPatch {
        ArtPatch {
            title: non_empty(self.title),
            img_url: non_empty(self.img_url),
            thumb_url: non_empty(self.thumb_url),
            medium: non_empty(self.medium),
            width: parse_number(self.width),
            height: parse_number(self.height),
            year: non_empty(self.year),
            description: non_empty(self.description),
            sold: non_empty(self.sold).map(|v| parse_form_bool(&v)),
            ordering: None,
        }
    }
}

pub async fn create_art(
    State(state): State<AppState>,
    Form(form): Form<ArtForm>,
) -> Result<Response> {
    let art = state.db.add_art(form.into_new_art()).await?;
    debug!("Created art {} from editor", art.id);
    Ok(redirect_to_edit())
}

#[derive(Debug, Deserialize)]
pub struct PatchQuery {
    pub replace: Option<String>,
}

/// Accepts JSON (drag-and-drop reordering) or form data (edit modal)
pub async fn patch_art(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PatchQuery>,
    request: Request,
) -> Result<Response> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let patch = if is_json {
        let Json(patch) = Json::<ArtPatch>::from_request(request, &state)
            .await
            .map_err(|e| WebError::BadRequest(e.body_text()))?;
        patch
    } else {
        let Form(form) = Form::<ArtForm>::from_request(request, &state)
            .await
            .map_err(|e| WebError::BadRequest(e.body_text()))?;
        form.into_patch()
    };

    state.db.update_art(&id, patch).await?;

    if query.replace.as_deref() == Some("true") {
        return Ok(redirect_to_edit());
    }

    let art = state
        .db
        .get_art(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("art {}", id)))?;
    Ok(Html(views::art_row(&art)).into_response())
}

/// Update one column; the new value is read from the form field of the same name
pub async fn patch_art_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(String, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>> {
    let value = form.get(&field).map(String::as_str).unwrap_or_default();
    state.db.update_art_field(&id, &field, value).await?;

    let art = state
        .db
        .get_art(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("art {}", id)))?;
    Ok(Html(views::art_row(&art)))
}

pub async fn delete_art(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<&'static str>> {
    if !state.db.delete_art(&id).await? {
        return Err(WebError::NotFound(format!("art {}", id)));
    }
    info!("Deleted art {}", id);
    Ok(Html(""))
}

pub async fn stored_text_modal(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Html<String>> {
    let content = state
        .db
        .get_stored_text(&reference_id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("stored text {}", reference_id)))?;
    Ok(Html(views::stored_text_modal(&reference_id, &content)))
}

#[derive(Debug, Deserialize)]
pub struct StoredTextForm {
    #[serde(default)]
    pub content: String,
}

pub async fn update_stored_text(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
    Form(form): Form<StoredTextForm>,
) -> Result<Html<&'static str>> {
    state.db.add_stored_text(&reference_id, &form.content).await?;
    Ok(Html(""))
}

/// Print fields as posted by the editor forms
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrintForm {
    pub title: Option<String>,
    pub img_url: Option<String>,
    pub thumb_url: Option<String>,
    pub medium: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub quantity_left: Option<String>,
    pub ordering: Option<String>,
    pub show_in_store: Option<String>,
}

impl PrintForm {
    fn into_new_print(self) -> NewPrint {
        NewPrint {
            title: self.title.unwrap_or_default(),
            img_url: self.img_url.unwrap_or_default(),
            thumb_url: self.thumb_url.unwrap_or_default(),
            medium: self.medium.unwrap_or_default(),
            width: parse_number(self.width).unwrap_or_default(),
            height: parse_number(self.height).unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: parse_number(self.price).unwrap_or_default(),
            quantity_left: parse_number(self.quantity_left).unwrap_or_default(),
            ordering: parse_number(self.ordering).unwrap_or_default(),
            show_in_store: self.show_in_store.as_deref().is_none_or(parse_form_bool),
        }
    }

    fn into_patch(self) -> PrintPatch {
        PrintPatch {
            title: non_empty(self.title),
            img_url: non_empty(self.img_url),
            thumb_url: non_empty(self.thumb_url),
            medium: non_empty(self.medium),
            width: parse_number(self.width),
            height: parse_number(self.height),
            year: non_empty(self.year),
            description: non_empty(self.description),
            price: parse_number(self.price),
            quantity_left: parse_number(self.quantity_left),
            ordering: parse_number(self.ordering),
            show_in_store: non_empty(self.show_in_store).map(|v| parse_form_bool(&v)),
        }
    }
}

pub async fn create_print(
    State(state): State<AppState>,
    Form(form): Form<PrintForm>,
) -> Result<Response> {
    let print = state.db.add_print(form.into_new_print()).await?;
    debug!("Created print {} from editor", print.id);
    Ok(redirect_to_edit())
}

pub async fn patch_print(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PrintForm>,
) -> Result<Html<String>> {
    state.db.update_print(&id, form.into_patch()).await?;

    let print = state
        .db
        .get_print(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("print {}", id)))?;
    Ok(Html(views::print_row(&print)))
}

pub async fn delete_print(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<&'static str>> {
    if !state.db.delete_print(&id).await? {
        return Err(WebError::NotFound(format!("print {}", id)));
    }
    info!("Deleted print {}", id);
    Ok(Html(""))
}

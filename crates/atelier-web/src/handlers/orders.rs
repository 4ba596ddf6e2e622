//! Order administration

use axum::extract::{Path, State};
use axum::response::{Html, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

use atelier_core::db::parse_form_bool;
use atelier_core::OrderStatus;

use crate::error::{Result, WebError};
use crate::render::PageContext;
use crate::server::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub order_status: String,
}

/// Unchecked checkboxes send nothing, so a missing field means unpaid
#[derive(Debug, Deserialize)]
pub struct PaidForm {
    pub paid: Option<String>,
}

async fn order_card(state: &AppState, order_id: &str) -> Result<Html<String>> {
    let order = state
        .db
        .get_order(order_id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("order {}", order_id)))?;
    Ok(Html(views::order_card(&order)))
}

pub async fn orders_page(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    let orders = state.db.list_orders().await?;
    ctx.render(&state, views::orders_page(&orders)).await
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Html<String>> {
    let status: OrderStatus = form.order_status.parse()?;
    state.db.update_order_status(&order_id, status).await?;
    info!("Order {} set to {}", order_id, status);

    order_card(&state, &order_id).await
}

pub async fn toggle_paid(
    State(state): State<AppState>,
    Path((order_id, row_uuid)): Path<(String, String)>,
    Form(form): Form<PaidForm>,
) -> Result<Html<String>> {
    let paid = form.paid.as_deref().is_some_and(parse_form_bool);
    state.db.set_order_row_paid(&row_uuid, paid).await?;
    info!("Order row {} paid={}", row_uuid, paid);

    order_card(&state, &order_id).await
}

//! Cart and checkout
//!
//! The cart lives entirely in the `cart` cookie; every mutation decodes
//! it, applies the change and writes it back.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use atelier_core::cart::DEFAULT_ITEM_TYPE;
use atelier_core::{Cart, Database, Order, OrderRow};

use crate::cart_cookie::{get_cart, save_cart};
use crate::error::{Result, WebError};
use crate::render::PageContext;
use crate::server::AppState;
use crate::views::{self, CartLine};

/// Identifies a cart line; `type` defaults to `print`
#[derive(Debug, Deserialize)]
pub struct ItemForm {
    pub print_id: String,
    #[serde(rename = "type", default)]
    pub typ: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    #[serde(rename = "type", default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
}

fn item_type(typ: Option<&str>) -> &str {
    match typ.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_ITEM_TYPE,
    }
}

/// Badge updates swapped into the layout out of band
fn badge_update(cart: &Cart) -> String {
    views::cart_badge(cart.total_quantity(), true)
}

/// Join cart items with their prints, skipping prints that no longer exist
async fn cart_lines(db: &Database, cart: &Cart) -> Result<Vec<CartLine>> {
    let mut lines = Vec::with_capacity(cart.len());
    for item in cart.items() {
        match db.get_print(&item.print_id).await? {
            Some(print) => lines.push(CartLine {
                print_id: item.print_id.clone(),
                typ: item.typ.clone(),
                quantity: item.quantity,
                title: print.title,
                thumb_url: print.thumb_url,
                price: print.price,
            }),
            None => warn!("Cart refers to missing print {}, skipping", item.print_id),
        }
    }
    Ok(lines)
}

pub async fn cart_page(
    State(state): State<AppState>,
    jar: CookieJar,
    ctx: PageContext,
) -> Result<Response> {
    let cart = get_cart(&jar);
    let lines = cart_lines(&state.db, &cart).await?;
    ctx.render(&state, views::cart_page(&lines)).await
}

pub async fn add_to_cart(
    jar: CookieJar,
    Form(form): Form<ItemForm>,
) -> Result<(CookieJar, Html<String>)> {
    if form.print_id.trim().is_empty() {
        return Err(WebError::BadRequest("print_id is required".to_string()));
    }

    let mut cart = get_cart(&jar);
    cart.add(&form.print_id, item_type(form.typ.as_deref()));
    let jar = save_cart(jar, &cart)?;

    Ok((jar, Html(views::bought_button() + &badge_update(&cart))))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ItemForm>,
) -> Result<(CookieJar, Html<String>)> {
    let mut cart = get_cart(&jar);
    cart.remove(&form.print_id, item_type(form.typ.as_deref()));
    let jar = save_cart(jar, &cart)?;

    let lines = cart_lines(&state.db, &cart).await?;
    Ok((jar, Html(views::cart_page(&lines) + &badge_update(&cart))))
}

pub async fn change_quantity(
    Path(print_id): Path<String>,
    jar: CookieJar,
    Form(form): Form<QuantityForm>,
) -> Result<(CookieJar, Html<String>)> {
    let mut cart = get_cart(&jar);
    cart.set_quantity(&print_id, item_type(form.typ.as_deref()), &form.quantity);
    let jar = save_cart(jar, &cart)?;

    Ok((jar, Html(badge_update(&cart))))
}

pub async fn checkout(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(WebError::BadRequest("email is required".to_string()));
    }

    let cart = get_cart(&jar);
    let order_id = uuid::Uuid::new_v4().to_string();

    let mut rows = Vec::with_capacity(cart.len());
    for item in cart.items() {
        let Some(print) = state.db.get_print(&item.print_id).await? else {
            warn!("Skipping missing print {} at checkout", item.print_id);
            continue;
        };
        let row = OrderRow::placed(
            &order_id,
            email,
            &item.print_id,
            &print.title,
            &item.typ,
            item.quantity,
            print.price,
        );
        rows.push(row);
    }

    let Some(order) = Order::from_rows(rows.clone()) else {
        return Err(WebError::BadRequest("cart is empty".to_string()));
    };
    state.db.add_order(rows).await?;
    info!(
        "Order {} placed by {} with {} rows",
        order.order_id,
        order.buyer_email,
        order.rows.len()
    );

    let notified = match state.notifier.send_order(&order).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send notification for order {}: {}", order.order_id, e);
            false
        }
    };

    let empty = Cart::new();
    let jar = save_cart(jar, &empty)?;
    Ok((jar, Html(views::thanks(notified) + &badge_update(&empty))).into_response())
}

pub async fn thanks(State(state): State<AppState>, ctx: PageContext) -> Result<Response> {
    ctx.render(&state, views::thanks(true)).await
}

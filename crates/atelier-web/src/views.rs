//! HTML fragments
//!
//! Markup is built with `format!`; every interpolated value that comes
//! from the database or the request goes through [`escape`].

use std::fmt::Write as _;

use atelier_core::db::{Art, Order, OrderStatus, Print, StoredText};

use crate::render::NavRoute;

/// Escape text for use in HTML content and quoted attributes
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn layout(routes: &[NavRoute], current_path: &str, cart_count: i64, content: &str) -> String {
    let mut nav = String::new();
    for route in routes.iter().filter(|r| r.in_sidebar) {
        let active = if route.path == current_path { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            r##"<a href="{path}" hx-get="{path}" hx-target="#content" hx-push-url="true"{active}>{name}</a>"##,
            path = route.path,
            active = active,
            name = escape(&route.name),
        );
    }

    let home = routes
        .iter()
        .find(|r| r.path == "/")
        .map(|r| escape(&r.name))
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{home}</title>
<link rel="stylesheet" href="/static/styles.css">
<script src="https://unpkg.com/htmx.org@2.0.3"></script>
</head>
<body>
<header>
<a href="/" class="logo">{home}</a>
<nav>{nav}</nav>
{badge}
</header>
<main id="content">{content}</main>
<div id="modal"></div>
</body>
</html>"##,
        home = home,
        nav = nav,
        badge = cart_badge(cart_count, false),
        content = content,
    )
}

/// Cart link with item count. `oob` marks it for an out-of-band swap.
pub fn cart_badge(count: i64, oob: bool) -> String {
    let swap = if oob { r##" hx-swap-oob="true""## } else { "" };
    format!(
        r##"<a id="cart-badge" href="/cart" hx-get="/cart" hx-target="#content" hx-push-url="true"{swap}>Cart ({count})</a>"##,
        swap = swap,
        count = count,
    )
}

pub fn home(title: &str) -> String {
    format!(r##"<section class="home"><h1>{}</h1></section>"##, escape(title))
}

fn art_card(art: &Art) -> String {
    let sold = if art.sold { r##"<span class="sold">Sold</span>"## } else { "" };
    format!(
        r##"<figure class="art-card" hx-get="/gallery/{id}" hx-target="#modal">
<img src="/static/{thumb}" alt="{title}" loading="lazy">
<figcaption>{title}{sold}</figcaption>
</figure>"##,
        id = escape(&art.id),
        thumb = escape(&art.thumb_url),
        title = escape(&art.title),
        sold = sold,
    )
}

/// Gallery cards plus a loader for the next page when one may exist
pub fn gallery_items(arts: &[Art], page: i64, has_more: bool) -> String {
    let mut html: String = arts.iter().map(art_card).collect();
    if has_more {
        let _ = write!(
            html,
            r##"<div class="load-more" hx-get="/gallery?page={}" hx-trigger="revealed" hx-swap="outerHTML"></div>"##,
            page.saturating_add(1)
        );
    }
    html
}

pub fn gallery(title: &str, arts: &[Art], page: i64, has_more: bool) -> String {
    format!(
        r##"<section class="gallery"><h1>{}</h1><div class="grid">{}</div></section>"##,
        escape(title),
        gallery_items(arts, page, has_more)
    )
}

pub fn art_detail(art: &Art) -> String {
    format!(
        r##"<div class="modal art-detail">
<img src="/static/{img}" alt="{title}">
<h2>{title}</h2>
<p>{medium} {width} x {height} cm {year}</p>
<p>{description}</p>
{sold}
<button hx-get="/modal/close" hx-target="#modal">Close</button>
</div>"##,
        img = escape(&art.img_url),
        title = escape(&art.title),
        medium = escape(&art.medium),
        width = art.width,
        height = art.height,
        year = escape(&art.year),
        description = escape(&art.description),
        sold = if art.sold { "<p class=\"sold\">Sold</p>" } else { "" },
    )
}

pub fn text_page(title: &str, text: &str) -> String {
    let paragraphs: String = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p)))
        .collect();
    format!(
        r##"<section class="text-page"><h1>{}</h1>{}</section>"##,
        escape(title),
        paragraphs
    )
}

pub fn prints_page(title: &str, text: &str, prints: &[Print]) -> String {
    let mut cards = String::new();
    for print in prints {
        let _ = write!(
            cards,
            r##"<article class="print">
<img src="/static/{thumb}" alt="{title}" loading="lazy">
<h3>{title}</h3>
<p class="price">{price:.2}</p>
<form hx-post="/cart/add" hx-swap="outerHTML">
<input type="hidden" name="print_id" value="{id}">
<input type="hidden" name="type" value="print">
<button type="submit">Add to cart</button>
</form>
</article>"##,
            thumb = escape(&print.thumb_url),
            title = escape(&print.title),
            price = print.price,
            id = escape(&print.id),
        );
    }
    format!(
        r##"{}<div class="prints">{}</div>"##,
        text_page(title, text),
        cards
    )
}

pub fn bought_button() -> String {
    r##"<button class="bought" disabled>Added to cart</button>"##.to_string()
}

/// A cart line joined with the print it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub print_id: String,
    pub typ: String,
    pub quantity: i64,
    pub title: String,
    pub thumb_url: String,
    pub price: f64,
}

pub fn cart_page(lines: &[CartLine]) -> String {
    if lines.is_empty() {
        return r##"<section id="cart" class="cart"><h1>Cart</h1><p class="empty">Your cart is empty.</p></section>"##
            .to_string();
    }

    let mut rows = String::new();
    for line in lines {
        let _ = write!(
            rows,
            r##"<li class="cart-line">
<img src="/static/{thumb}" alt="{title}">
<span class="title">{title}</span>
<span class="type">{typ}</span>
<input type="number" name="quantity" min="1" value="{quantity}"
 hx-put="/cart/{id}/quantity" hx-vals='{{"type": "{typ}"}}' hx-trigger="change" hx-swap="none">
<span class="price">{price:.2}</span>
<form hx-post="/cart/remove" hx-target="#cart" hx-swap="outerHTML">
<input type="hidden" name="print_id" value="{id}">
<input type="hidden" name="type" value="{typ}">
<button type="submit">Remove</button>
</form>
</li>"##,
            thumb = escape(&line.thumb_url),
            title = escape(&line.title),
            typ = escape(&line.typ),
            quantity = line.quantity,
            id = escape(&line.print_id),
            price = line.price,
        );
    }

    let total: f64 = lines.iter().map(|l| l.quantity as f64 * l.price).sum();
    format!(
        r##"<section id="cart" class="cart"><h1>Cart</h1>
<ul>{rows}</ul>
<p class="total">Total: {total:.2}</p>
<form hx-post="/cart/checkout" hx-target="#cart" hx-swap="outerHTML">
<input type="email" name="email" placeholder="Email" required>
<button type="submit">Place order</button>
</form>
</section>"##,
        rows = rows,
        total = total,
    )
}

pub fn thanks(notified: bool) -> String {
    let note = if notified {
        "I will contact you by email about payment and delivery."
    } else {
        "Your order is saved, but the confirmation could not be delivered. I will still be in touch."
    };
    format!(
        r##"<section id="cart" class="thanks"><h1>Thank you for your order!</h1><p>{}</p></section>"##,
        note
    )
}

pub fn login(redirect_to: Option<&str>) -> String {
    let redirect = redirect_to
        .map(|t| format!(r##"<input type="hidden" name="redirect_to" value="{}">"##, escape(t)))
        .unwrap_or_default();
    format!(
        r##"<section class="login"><h1>Log in</h1>
<form hx-post="/login" hx-target="#login-error">
{redirect}
<input type="text" name="username" placeholder="Username" autocomplete="username">
<input type="password" name="password" placeholder="Password" autocomplete="current-password">
<button type="submit">Log in</button>
<div id="login-error"></div>
</form>
</section>"##,
        redirect = redirect
    )
}

pub fn login_error() -> String {
    r##"<p class="error">Wrong username or password.</p>"##.to_string()
}

pub fn art_row(art: &Art) -> String {
    format!(
        r##"<tr id="art-{id}" data-id="{id}" data-ordering="{ordering}">
<td><img src="/static/{thumb}" alt="{title}" width="48"></td>
<td>{title}</td>
<td><input type="checkbox" name="sold"{checked} hx-patch="/edit/art/{id}/sold" hx-vals='js:{{sold: event.target.checked}}' hx-target="#art-{id}" hx-swap="outerHTML"></td>
<td><button hx-get="/edit/art/modal/{id}" hx-target="#modal">Edit</button>
<button hx-delete="/edit/art/{id}" hx-target="#art-{id}" hx-swap="outerHTML" hx-confirm="Delete {title}?">Delete</button></td>
</tr>"##,
        id = escape(&art.id),
        ordering = art.ordering,
        thumb = escape(&art.thumb_url),
        title = escape(&art.title),
        checked = if art.sold { " checked" } else { "" },
    )
}

pub fn print_row(print: &Print) -> String {
    format!(
        r##"<tr id="print-{id}">
<td>{title}</td>
<td><input type="number" step="0.01" name="price" value="{price:.2}" hx-patch="/edit/print/{id}" hx-target="#print-{id}" hx-swap="outerHTML"></td>
<td><input type="number" name="quantity_left" value="{left}" hx-patch="/edit/print/{id}" hx-target="#print-{id}" hx-swap="outerHTML"></td>
<td>{shown}</td>
<td><button hx-delete="/edit/print/{id}" hx-target="#print-{id}" hx-swap="outerHTML" hx-confirm="Delete {title}?">Delete</button></td>
</tr>"##,
        id = escape(&print.id),
        title = escape(&print.title),
        price = print.price,
        left = print.quantity_left,
        shown = if print.show_in_store { "In store" } else { "Hidden" },
    )
}

pub fn edit_page(arts: &[Art], texts: &[StoredText], prints: &[Print]) -> String {
    let art_rows: String = arts.iter().map(art_row).collect();
    let print_rows: String = prints.iter().map(print_row).collect();

    let mut text_rows = String::new();
    for text in texts {
        let _ = write!(
            text_rows,
            r##"<li><button hx-get="/edit/storedtext/modal/{id}" hx-target="#modal">{id}</button> {preview}</li>"##,
            id = escape(&text.reference_id),
            preview = escape(&text.content.chars().take(60).collect::<String>()),
        );
    }

    format!(
        r##"<section class="edit">
<h1>Edit</h1>
<nav><a href="/orders">Orders</a> <a href="/edit/resetorder">Reset ordering</a>
<form hx-post="/logout" hx-target="body"><button type="submit">Log out</button></form></nav>
<h2>Art</h2>
<button hx-get="/edit/art/modal/new" hx-target="#modal">Add art</button>
<table class="arts"><tbody>{art_rows}</tbody></table>
<h2>Prints</h2>
<form class="new-print" hx-post="/edit/print">
<input type="text" name="title" placeholder="Title">
<input type="text" name="img_url" placeholder="Image URL">
<input type="text" name="thumb_url" placeholder="Thumbnail URL">
<input type="number" step="0.01" name="price" placeholder="Price">
<input type="number" name="quantity_left" placeholder="Quantity">
<button type="submit">Add print</button>
</form>
<table class="prints"><tbody>{print_rows}</tbody></table>
<h2>Texts</h2>
<ul class="texts">{text_rows}</ul>
</section>"##,
        art_rows = art_rows,
        print_rows = print_rows,
        text_rows = text_rows,
    )
}

/// Create form when `art` is `None`, edit form otherwise
pub fn art_modal(art: Option<&Art>) -> String {
    let field = |name: &str, value: String| {
        format!(
            r##"<label>{name}<input type="text" name="{name}" value="{value}"></label>"##,
            name = name,
            value = escape(&value)
        )
    };

    let (action, heading) = match art {
        Some(art) => (
            format!(r##"hx-patch="/edit/art/{}?replace=true""##, escape(&art.id)),
            "Edit art",
        ),
        None => (r##"hx-post="/edit/art""##.to_string(), "Add art"),
    };

    let fields = [
        field("title", art.map(|a| a.title.clone()).unwrap_or_default()),
        field("img_url", art.map(|a| a.img_url.clone()).unwrap_or_default()),
        field("thumb_url", art.map(|a| a.thumb_url.clone()).unwrap_or_default()),
        field("medium", art.map(|a| a.medium.clone()).unwrap_or_default()),
        field("width", art.map(|a| a.width.to_string()).unwrap_or_default()),
        field("height", art.map(|a| a.height.to_string()).unwrap_or_default()),
        field("year", art.map(|a| a.year.clone()).unwrap_or_default()),
        field("description", art.map(|a| a.description.clone()).unwrap_or_default()),
    ]
    .concat();

    format!(
        r##"<div class="modal"><h2>{heading}</h2>
<form {action}>{fields}
<label>sold<input type="checkbox" name="sold" value="true"{checked}></label>
<button type="submit">Save</button>
<button type="button" hx-get="/modal/close" hx-target="#modal">Cancel</button>
</form></div>"##,
        heading = heading,
        action = action,
        fields = fields,
        checked = if art.is_some_and(|a| a.sold) { " checked" } else { "" },
    )
}

pub fn stored_text_modal(reference_id: &str, content: &str) -> String {
    format!(
        r##"<div class="modal"><h2>{id}</h2>
<form hx-put="/edit/storedtext/{id}" hx-swap="none">
<textarea name="content" rows="12">{content}</textarea>
<button type="submit">Save</button>
<button type="button" hx-get="/modal/close" hx-target="#modal">Close</button>
</form></div>"##,
        id = escape(reference_id),
        content = escape(content),
    )
}

pub fn order_card(order: &Order) -> String {
    let mut options = String::new();
    for status in OrderStatus::ALL {
        let selected = if status == order.status { " selected" } else { "" };
        let _ = write!(options, r##"<option value="{0}"{1}>{0}</option>"##, status, selected);
    }

    let mut rows = String::new();
    for row in &order.rows {
        let _ = write!(
            rows,
            r##"<tr><td>{title}</td><td>{typ}</td><td>{quantity}</td><td>{price:.2}</td>
<td><input type="checkbox" name="paid" value="true"{paid} hx-post="/orders/{order_id}/row/{uuid}/toggle_paid" hx-target="#order-{order_id}" hx-swap="outerHTML"></td></tr>"##,
            title = escape(&row.title),
            typ = escape(&row.typ),
            quantity = row.quantity,
            price = row.price,
            paid = if row.has_paid { " checked" } else { "" },
            order_id = escape(&order.order_id),
            uuid = escape(&row.uuid),
        );
    }

    let stamp = |label: &str, at: Option<chrono::DateTime<chrono::Utc>>| {
        at.map(|t| format!("<p>{}: {}</p>", label, t.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default()
    };

    format!(
        r##"<article id="order-{id}" class="order{paid_class}">
<h3>{email}</h3>
<p>Placed: {created}</p>{contacted}{sent}
<select name="order_status" hx-post="/orders/{id}/update_status" hx-target="#order-{id}" hx-swap="outerHTML">{options}</select>
<table><tbody>{rows}</tbody></table>
<p class="total">Total: {total:.2}</p>
</article>"##,
        id = escape(&order.order_id),
        paid_class = if order.has_paid_all { " paid" } else { "" },
        email = escape(&order.buyer_email),
        created = order.created_at.format("%Y-%m-%d %H:%M"),
        contacted = stamp("Contacted", order.contacted_at),
        sent = stamp("Sent", order.sent_at),
        options = options,
        rows = rows,
        total = order.total_price,
    )
}

pub fn orders_page(orders: &[Order]) -> String {
    let cards: String = orders.iter().map(order_card).collect();
    format!(r##"<section class="orders"><h1>Orders</h1>{}</section>"##, cards)
}

//! HTTP handlers
//!
//! Request handlers for the public site, the cart, login and the admin editor.

pub mod api;
pub mod auth;
pub mod cart;
pub mod edit;
pub mod orders;
pub mod pages;

use crate::error::Result;
use crate::server::AppState;

/// Current content of a stored text, empty when it has never been written
pub(crate) async fn stored_text(state: &AppState, reference_id: &str) -> Result<String> {
    Ok(state
        .db
        .get_stored_text(reference_id)
        .await?
        .unwrap_or_default())
}

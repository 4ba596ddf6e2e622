//! Cookie value codec for carts
//!
//! A cart travels as standard (padded) base64 of its JSON array form.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::Result;
use crate::cart::Cart;

/// Name of the cookie holding the encoded cart
pub const CART_COOKIE: &str = "cart";

/// Encode a cart into a cookie-safe value
pub fn encode_cart(cart: &Cart) -> Result<String> {
    let json = serde_json::to_vec(cart)?;
    Ok(STANDARD.encode(json))
}

/// Decode a cookie value, reporting why it could not be read
pub fn try_decode_cart(value: &str) -> Result<Cart> {
    let bytes = STANDARD.decode(value)?;
    let mut cart: Cart = serde_json::from_slice(&bytes)?;
    cart.normalize();
    Ok(cart)
}

/// Decode a cookie value. A corrupt value yields an empty cart.
pub fn decode_cart(value: &str) -> Cart {
    match try_decode_cart(value) {
        Ok(cart) => {
            debug!("Cart decoded with {} items", cart.len());
            cart
        }
        Err(e) => {
            warn!("Discarding corrupt cart cookie: {}", e);
            Cart::new()
        }
    }
}

//! Reading and writing the cart cookie

use axum_extra::extract::cookie::{Cookie, CookieJar};

use atelier_core::Result;
use atelier_core::cart::{CART_COOKIE, Cart, decode_cart, encode_cart};

/// The cart carried by the request. Missing or corrupt cookies give an empty cart.
pub fn get_cart(jar: &CookieJar) -> Cart {
    jar.get(CART_COOKIE)
        .map(|cookie| decode_cart(cookie.value()))
        .unwrap_or_default()
}

/// Store `cart` in the response cookie
pub fn save_cart(jar: CookieJar, cart: &Cart) -> Result<CookieJar> {
    let value = encode_cart(cart)?;
    let cookie = Cookie::build((CART_COOKIE, value)).path("/").http_only(true);
    Ok(jar.add(cookie))
}

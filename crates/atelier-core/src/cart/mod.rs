//! Shopping cart carried entirely in a client cookie

mod codec;
mod types;

pub use codec::{CART_COOKIE, decode_cart, encode_cart, try_decode_cart};
pub use types::{Cart, CartItem, DEFAULT_ITEM_TYPE, MAX_QUANTITY, parse_quantity};

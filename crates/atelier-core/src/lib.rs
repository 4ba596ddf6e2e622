//! atelier-core: domain layer of the atelier gallery site
//!
//! Login sessions, the cookie-encoded shopping cart, the SQLite catalog
//! of artworks, prints, orders and page text, order notifications and
//! configuration loading.

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod session;

pub use cart::{Cart, CartItem};
pub use config::Config;
pub use db::{Art, Database, Order, OrderRow, OrderStatus, Print, StoredText};
pub use error::{Error, Result};
pub use notify::{LogNotifier, Notifier};
pub use session::{Session, SessionStore};

//! atelier-web: HTTP front end of the atelier gallery site
//!
//! HTMX-driven pages for the gallery and print shop, the cookie cart and
//! checkout, the admin editor behind a session login, and a token-guarded
//! database download API. Built with axum.

pub mod cart_cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod server;
pub mod views;

pub use error::{Result, WebError};
pub use server::{AppState, app, start_server};

//! Middleware modules
//!
//! Contains the admin session gate and the API bearer token check.

pub mod api_token;
pub mod auth;

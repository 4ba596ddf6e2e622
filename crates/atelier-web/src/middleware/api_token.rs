//! Bearer token middleware for the database download API

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::server::AppState;

/// API token authentication middleware
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if validate_api_token(provided, state.config.api.token.as_deref()) {
        Ok(next.run(request).await)
    } else {
        warn!("Rejected API request to {}", request.uri().path());
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Without a configured token every request is refused
pub fn validate_api_token(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(p), Some(e)) => !e.is_empty() && p == e,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_token_no_token_configured() {
        assert!(!validate_api_token(None, None));
        assert!(!validate_api_token(Some("any"), None));
        assert!(!validate_api_token(Some(""), Some("")));
    }

    #[test]
    fn test_validate_api_token_with_token_configured() {
        assert!(!validate_api_token(None, Some("secret")));
        assert!(!validate_api_token(Some("wrong"), Some("secret")));
        assert!(validate_api_token(Some("secret"), Some("secret")));
    }
}

use super::SharedState;
use super::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim()
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
}

/// Rejects requests whose `Authorization: Bearer` token does not match the configured one.
pub async fn require_bearer(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match bearer_token(&request) {
        Some(token) if constant_time_eq(token.as_bytes(), state.access_token.as_bytes()) => {}
        Some(_) => return Err(ApiError::unauthorized("Invalid access token")),
        None => return Err(ApiError::unauthorized("Missing bearer token")),
    }
    Ok(next.run(request).await)
}

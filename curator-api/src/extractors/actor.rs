//! Caller identity from request headers.
//!
//! The gateway sits behind an authenticating proxy that forwards who is
//! calling. Every header is optional; a missing or non-UTF-8 header becomes
//! an empty string, so extraction never rejects a request.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use curator_core::Actor;
use std::convert::Infallible;

pub const SESSION_ID_HEADER: &str = "x-session-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const PERSONA_HEADER: &str = "x-persona";

/// Extractor for the calling [`Actor`].
///
/// ```rust,ignore
/// async fn handler(ActorExtractor(actor): ActorExtractor) -> impl IntoResponse {
///     format!("hello {}", actor.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActorExtractor(pub Actor);

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

impl ActorExtractor {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(Actor::new(
            header_value(headers, SESSION_ID_HEADER),
            header_value(headers, USER_ID_HEADER),
            header_value(headers, PERSONA_HEADER),
        ))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActorExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl std::ops::Deref for ActorExtractor {
    type Target = Actor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

//! Caller identity.
//!
//! The fronting proxy authenticates users and forwards who they are in two
//! headers. Handlers take an [`Actor`] and check it against the permission
//! table with [`AppState::authorize`](super::AppState::authorize).

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use tracing::debug;

use super::error::ApiError;
use crate::permissions::Role;

/// Header carrying the caller's display name.
pub const HEADER_ACTOR: &str = "x-actor";
/// Header carrying the caller's role.
pub const HEADER_ROLE: &str = "x-actor-role";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let name = header(headers, HEADER_ACTOR)
            .ok_or(ApiError::Unauthorized("missing x-actor header"))?;
        let role = header(headers, HEADER_ROLE)
            .ok_or(ApiError::Unauthorized("missing x-actor-role header"))?;
        let role: Role = role.parse().map_err(|_| {
            debug!(role, "Rejected unknown role");
            ApiError::Unauthorized("unknown role")
        })?;
        Ok(Actor {
            name: name.to_string(),
            role,
        })
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_headers(&parts.headers)
    }
}

//! API handlers for ToolShare REST endpoints

pub mod health;
pub mod openapi;
pub mod reservations;
pub mod reviews;
pub mod tools;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, AppState};

/// Header carrying the acting user's id, set by the upstream auth gateway.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Extractor for the acting user. Authentication itself happens upstream;
/// this layer only requires that the gateway forwarded an identity.
pub struct Actor(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing X-User-Id header".to_string()))?;

        let user_id: i32 = header
            .parse()
            .map_err(|_| AppError::Authentication("Invalid X-User-Id header".to_string()))?;

        Ok(Actor(user_id))
    }
}

use super::state::ServerState;
use crate::authorization::Subject;
use crate::error::AppError;
use crate::user::User;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

/// The authenticated user of a request, resolved from a bearer access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn subject(&self) -> Subject {
        Subject::from(&self.user)
    }
}

pub const HEADER_AUTHORIZATION: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(parts) else {
            debug!("No bearer token in request headers");
            return Err(AppError::unauthorized(
                "Authentication credentials were not provided.",
            ));
        };
        let user = ctx.user_manager.authenticate_access(&token)?;
        Ok(Session { user })
    }
}

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::Response,
};

use crate::api::APIResponse;
use crate::handler::AppState;

pub const MISSING_IDENTITY: &str = "Not Authorized, no user identity";

/// The authenticated user a request acts for.
///
/// Authentication happens upstream; the gateway forwards the user id in a
/// trusted header (see `auth.identity_header`) and this extractor takes it as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    user_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(&state.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user_id {
            Some(user_id) => Ok(CallerIdentity::new(user_id)),
            None => {
                tracing::warn!(
                    header = %state.identity_header,
                    path = %parts.uri.path(),
                    "request without caller identity"
                );
                Err(APIResponse::failure(MISSING_IDENTITY).into_response_with(StatusCode::UNAUTHORIZED))
            }
        }
    }
}

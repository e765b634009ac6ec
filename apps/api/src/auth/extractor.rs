use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use super::token::{Claims, TokenService};
use crate::errors::AppError;

/// Authenticated caller, extracted from `Authorization: Bearer <token>`.
/// Handlers that take this argument are protected; the rejection is a 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        let token = bearer_token(parts)?;
        tokens.validate(token).map(AuthUser)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let malformed = || AppError::Unauthorized("Missing or malformed Authorization header".into());

    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(malformed)?
        .to_str()
        .map_err(|_| malformed())?;

    let (scheme, token) = value.trim().split_once(' ').ok_or_else(malformed)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(malformed());
    }
    Ok(token)
}

//! Request authentication.
//!
//! Two paths reach a [`Principal`]:
//!
//! - `Authorization: Bearer <token>` resolved by the identity provider.
//! - `x-service-key` carrying the shared service secret together with
//!   `x-acting-user` naming the user the service acts for.

use super::{ApiErr, AuthConfig};
use crate::tenancy::domain::{Principal, UserId};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

/// Header carrying the shared service secret.
pub const SERVICE_KEY_HEADER: &str = "x-service-key";
/// Header naming the user a service call acts for.
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AuthConfig: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthConfig::from_ref(state);
        if let Some(presented) = header(&parts.headers, SERVICE_KEY_HEADER) {
            return service_principal(&auth, presented, &parts.headers).map(Self);
        }
        let token = header(&parts.headers, "authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))?;
        let user_id = auth
            .identity()
            .resolve_session(token)
            .await
            .ok_or_else(|| ApiErr::unauthorized("invalid or expired session"))?;
        Ok(Self(Principal::session(user_id)))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn service_principal(
    auth: &AuthConfig,
    presented: &str,
    headers: &HeaderMap,
) -> Result<Principal, ApiErr> {
    if !auth.accepts_service_key(presented) {
        tracing::warn!("rejected service key");
        return Err(ApiErr::unauthorized("invalid service key"));
    }
    let acting = header(headers, ACTING_USER_HEADER)
        .ok_or_else(|| ApiErr::unauthorized("service calls must name an acting user"))?;
    let user_id = Uuid::parse_str(acting.trim())
        .map(UserId::from_uuid)
        .map_err(|_| ApiErr::unauthorized("acting user is not a valid id"))?;
    Ok(Principal::service(user_id))
}

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use tracing::debug;

use crate::claims::Claims;
use crate::error::Rejection;
use crate::guard::Guard;
use crate::verifier::parse_bearer;

/// Reads the claims stored by the [`authenticate`](crate::authenticate) middleware.
///
/// A route that is not behind the middleware has no claims and is rejected
/// as if the credential were missing.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(Rejection::MissingCredential)
    }
}

/// Verifies the bearer token directly, for routes that do not use the middleware layer.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub claims: Claims,
    pub token: String,
}

impl Authenticated {
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    Guard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Guard::from_ref(state);

        authenticate_parts(&guard, parts).inspect_err(|rejection| {
            debug!(
                code = rejection.code(),
                path = %parts.uri.path(),
                "rejected request"
            );
        })
    }
}

fn authenticate_parts(guard: &Guard, parts: &Parts) -> Result<Authenticated, Rejection> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(Rejection::MissingCredential)?;

    let token = parse_bearer(header_value)?.to_owned();
    let claims = guard.verify(&token)?;

    Ok(Authenticated { claims, token })
}

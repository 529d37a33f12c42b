use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{
    auth::api_key::{extract_credentials, AccessLevel, AccessPolicy},
    errors::AuthError,
    AppState,
};

fn authorize(req: &HttpRequest, policy: AccessPolicy) -> Result<AccessLevel, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState missing in request extractor");
        AuthError::MissingState
    })?;

    let credentials = extract_credentials(req);

    state.gate.authorize(policy, &credentials).inspect_err(|e| {
        tracing::warn!(path = %req.path(), reason = %e, "Rejected API credentials");
    })
}

/// Passes the public policy: always in open mode, otherwise requires the
/// low- or high-privilege key.
/// Usage: add `_access: PublicAccess` as a parameter to the handler.
#[derive(Debug, Clone, Copy)]
pub struct PublicAccess(pub AccessLevel);

impl FromRequest for PublicAccess {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req, AccessPolicy::Public).map(PublicAccess).map_err(Into::into))
    }
}

/// Requires the high-privilege key. Returns 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req, AccessPolicy::Admin).map(|_| AdminAccess).map_err(Into::into))
    }
}

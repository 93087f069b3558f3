//! Request extractors: bearer-token identities and JSON bodies.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use procura_core::PortalError;
use procura_store::{Admin, Vendor};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::{self, Claims, ROLE_ADMIN, ROLE_VENDOR};
use crate::error::ApiError;
use crate::server::AppState;

/// Authenticated vendor, loaded from the store. The record's approval status
/// is not checked here; a Pending or Rejected vendor's token still passes.
pub struct AuthVendor(pub Vendor);

/// Authenticated admin, loaded from the store.
pub struct AuthAdmin(pub Admin);

impl FromRequestParts<Arc<AppState>> for AuthVendor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        if claims.role != ROLE_VENDOR {
            return Err(PortalError::unauthorized("Not authorized as vendor").into());
        }
        let vendor = state
            .db
            .lock()
            .unwrap()
            .vendor_by_id(&claims.sub)
            .map_err(|_| PortalError::unauthorized("Not authorized, vendor not found"))?;
        Ok(Self(vendor))
    }
}

impl FromRequestParts<Arc<AppState>> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        if claims.role != ROLE_ADMIN {
            return Err(PortalError::unauthorized("Not authorized as admin").into());
        }
        let admin = state
            .db
            .lock()
            .unwrap()
            .admin_by_id(&claims.sub)
            .map_err(|_| PortalError::unauthorized("Not authorized, admin not found"))?;
        Ok(Self(admin))
    }
}

fn bearer_claims(parts: &Parts, state: &Arc<AppState>) -> Result<Claims, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PortalError::unauthorized("Not authorized, no token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| PortalError::unauthorized("Not authorized, no token"))?;
    Ok(auth::validate_token(token, &state.auth.jwt_secret)?)
}

/// JSON body extractor whose rejection is a `{ "message": ... }` 400 instead
/// of axum's plain-text default.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(PortalError::validation(rejection.body_text()).into()),
        }
    }
}

//! Vendor-facing routes: registration, login, and self-service profile
//! mutations.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use procura_core::PortalError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{self, ROLE_VENDOR};
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthVendor};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoRequest {
    #[serde(default)]
    pub profile_photo: String,
}

/// POST /api/vendors/register
///
/// The created vendor is always Pending; any status the client sends is
/// ignored by the request shape.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    if req.company_name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(PortalError::validation("Please provide all required fields").into());
    }

    let hash = auth::hash_password(&req.password)?;
    let vendor = state
        .db
        .lock()
        .unwrap()
        .register_vendor(&req.company_name, &req.email, &hash)?;
    let token = auth::create_token(
        &vendor.id,
        &vendor.email,
        ROLE_VENDOR,
        &state.auth.jwt_secret,
        state.auth.token_days,
    )?;

    tracing::info!("Vendor registered: {}", vendor.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": vendor.id,
            "companyName": vendor.company_name,
            "email": vendor.email,
            "status": vendor.status,
            "token": token,
        })),
    ))
}

/// POST /api/vendors/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(PortalError::validation("Please provide email and password").into());
    }

    let found = state.db.lock().unwrap().vendor_by_email(&req.email)?;
    match found {
        Some((vendor, hash)) if auth::verify_password(&req.password, &hash) => {
            let token = auth::create_token(
                &vendor.id,
                &vendor.email,
                ROLE_VENDOR,
                &state.auth.jwt_secret,
                state.auth.token_days,
            )?;
            Ok(Json(json!({
                "id": vendor.id,
                "companyName": vendor.company_name,
                "email": vendor.email,
                "status": vendor.status,
                "profilePhoto": vendor.profile_photo,
                "token": token,
            })))
        }
        _ => Err(PortalError::unauthorized("Invalid email or password").into()),
    }
}

/// PUT /api/vendors/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthVendor(vendor): AuthVendor,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.new_password.len() < 6 {
        return Err(
            PortalError::validation("Password must be at least 6 characters").into(),
        );
    }

    let db = state.db.lock().unwrap();
    let hash = db.vendor_password_hash(&vendor.id)?;
    if !auth::verify_password(&req.current_password, &hash) {
        return Err(PortalError::unauthorized("Current password is incorrect").into());
    }

    let new_hash = auth::hash_password(&req.new_password)?;
    db.set_vendor_password(&vendor.id, &new_hash)?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// PUT /api/vendors/change-email
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    AuthVendor(vendor): AuthVendor,
    ApiJson(req): ApiJson<ChangeEmailRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.new_email.is_empty() {
        return Err(PortalError::validation("Please provide the new email").into());
    }

    let db = state.db.lock().unwrap();
    let hash = db.vendor_password_hash(&vendor.id)?;
    if !auth::verify_password(&req.current_password, &hash) {
        return Err(PortalError::unauthorized("Current password is incorrect").into());
    }

    let updated = db.set_vendor_email(&vendor.id, &req.new_email)?;
    Ok(Json(json!({
        "message": "Email changed successfully",
        "email": updated.email,
    })))
}

/// PUT /api/vendors/upload-photo
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    AuthVendor(vendor): AuthVendor,
    ApiJson(req): ApiJson<UploadPhotoRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state
        .db
        .lock()
        .unwrap()
        .set_vendor_photo(&vendor.id, &req.profile_photo)?;
    Ok(Json(json!({
        "message": "Profile photo uploaded successfully",
        "profilePhoto": updated.profile_photo,
    })))
}

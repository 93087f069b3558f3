//! Admin routes: login, vendor approval, and admin self-service profile
//! mutations.

use axum::extract::{Path, State};
use axum::Json;
use procura_core::{PortalError, VendorStatus};
use procura_store::Vendor;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{self, ROLE_ADMIN};
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthAdmin};
use crate::routes::vendors::{ChangeEmailRequest, ChangePasswordRequest, LoginRequest, UploadPhotoRequest};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateVendorStatusRequest {
    pub status: VendorStatus,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(PortalError::validation("Please provide email and password").into());
    }

    let found = state.db.lock().unwrap().admin_by_email(&req.email)?;
    match found {
        Some((admin, hash)) if auth::verify_password(&req.password, &hash) => {
            let token = auth::create_token(
                &admin.id,
                &admin.email,
                ROLE_ADMIN,
                &state.auth.jwt_secret,
                state.auth.token_days,
            )?;
            Ok(Json(json!({
                "id": admin.id,
                "name": admin.name,
                "email": admin.email,
                "profilePhoto": admin.profile_photo,
                "token": token,
            })))
        }
        _ => Err(PortalError::unauthorized("Invalid email or password").into()),
    }
}

/// GET /api/admin/vendors
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
) -> ApiResult<Json<Vec<Vendor>>> {
    let vendors = state.db.lock().unwrap().list_vendors()?;
    Ok(Json(vendors))
}

/// PUT /api/admin/vendors/{id}
///
/// Sets the approval status; Approved and Rejected may be toggled freely.
pub async fn update_vendor_status(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateVendorStatusRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let vendor = state.db.lock().unwrap().set_vendor_status(&id, req.status)?;
    tracing::info!("Vendor {} set to {}", vendor.email, req.status);
    Ok(Json(json!({
        "message": format!("Vendor {} successfully", req.status.as_str().to_lowercase()),
        "vendor": vendor,
    })))
}

/// PUT /api/admin/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.new_password.len() < 6 {
        return Err(
            PortalError::validation("Password must be at least 6 characters").into(),
        );
    }

    let db = state.db.lock().unwrap();
    let hash = db.admin_password_hash(&admin.id)?;
    if !auth::verify_password(&req.current_password, &hash) {
        return Err(PortalError::unauthorized("Current password is incorrect").into());
    }

    let new_hash = auth::hash_password(&req.new_password)?;
    db.set_admin_password(&admin.id, &new_hash)?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// PUT /api/admin/change-email
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    ApiJson(req): ApiJson<ChangeEmailRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.new_email.is_empty() {
        return Err(PortalError::validation("Please provide the new email").into());
    }

    let db = state.db.lock().unwrap();
    let hash = db.admin_password_hash(&admin.id)?;
    if !auth::verify_password(&req.current_password, &hash) {
        return Err(PortalError::unauthorized("Current password is incorrect").into());
    }

    let updated = db.set_admin_email(&admin.id, &req.new_email)?;
    Ok(Json(json!({
        "message": "Email changed successfully",
        "email": updated.email,
    })))
}

/// PUT /api/admin/upload-photo
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    ApiJson(req): ApiJson<UploadPhotoRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state
        .db
        .lock()
        .unwrap()
        .set_admin_photo(&admin.id, &req.profile_photo)?;
    Ok(Json(json!({
        "message": "Profile photo uploaded successfully",
        "profilePhoto": updated.profile_photo,
    })))
}

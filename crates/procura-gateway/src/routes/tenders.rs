//! Tender routes. Listing and retrieval are public; creation, update,
//! deletion, and the per-tender bid listing are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use procura_core::PortalError;
use procura_store::{BidView, NewTender, Tender, TenderPatch, TenderView};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthAdmin};
use crate::server::AppState;

/// POST /api/tenders
pub async fn create_tender(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    ApiJson(req): ApiJson<NewTender>,
) -> ApiResult<(StatusCode, Json<Tender>)> {
    if req.title.is_empty()
        || req.description.is_empty()
        || req.category.is_empty()
        || req.deadline.is_empty()
        || req.budget == 0.0
    {
        return Err(PortalError::validation("Please provide all required fields").into());
    }
    if req.budget < 0.0 {
        return Err(PortalError::validation("Budget must be a positive number").into());
    }

    let tender = state.db.lock().unwrap().create_tender(&admin.id, &req)?;
    tracing::info!("Tender created: {} ({})", tender.title, tender.id);
    Ok((StatusCode::CREATED, Json(tender)))
}

/// GET /api/tenders
pub async fn list_tenders(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TenderView>>> {
    let tenders = state.db.lock().unwrap().list_tenders()?;
    Ok(Json(tenders))
}

/// GET /api/tenders/{id}
pub async fn get_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TenderView>> {
    let tender = state.db.lock().unwrap().tender_by_id(&id)?;
    Ok(Json(tender))
}

/// PUT /api/tenders/{id}
///
/// Partial update; fields absent from the body keep their stored values.
pub async fn update_tender(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TenderPatch>,
) -> ApiResult<Json<Tender>> {
    if let Some(budget) = patch.budget {
        if budget <= 0.0 {
            return Err(PortalError::validation("Budget must be a positive number").into());
        }
    }
    let tender = state.db.lock().unwrap().update_tender(&id, &patch)?;
    Ok(Json(tender))
}

/// DELETE /api/tenders/{id}
pub async fn delete_tender(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.lock().unwrap().delete_tender(&id)?;
    tracing::info!("Tender removed: {id}");
    Ok(Json(json!({ "message": "Tender removed" })))
}

/// GET /api/tenders/{id}/bids
pub async fn tender_bids(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<BidView>>> {
    let bids = state.db.lock().unwrap().bids_for_tender(&id)?;
    Ok(Json(bids))
}

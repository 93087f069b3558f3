//! Bid routes: vendor submission and listing, admin status updates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use procura_core::{BidStatus, PortalError};
use procura_store::{BidView, NewBid};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthAdmin, AuthVendor};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateBidStatusRequest {
    pub status: BidStatus,
}

/// POST /api/bids
///
/// Submission requires an Open tender and no prior bid by this vendor on it.
/// The vendor's approval status is not checked here (client-side gate).
pub async fn submit_bid(
    State(state): State<Arc<AppState>>,
    AuthVendor(vendor): AuthVendor,
    ApiJson(req): ApiJson<NewBid>,
) -> ApiResult<(StatusCode, Json<BidView>)> {
    if req.tender_id.is_empty() || req.proposal.is_empty() {
        return Err(PortalError::validation("Please provide all required fields").into());
    }
    if req.bid_amount <= 0.0 {
        return Err(PortalError::validation("Bid amount must be a positive number").into());
    }
    if req.delivery_time <= 0 {
        return Err(
            PortalError::validation("Delivery time must be a positive number of days").into(),
        );
    }

    let bid = state.db.lock().unwrap().submit_bid(&vendor.id, &req)?;
    Ok((StatusCode::CREATED, Json(bid)))
}

/// GET /api/bids/my-bids
pub async fn my_bids(
    State(state): State<Arc<AppState>>,
    AuthVendor(vendor): AuthVendor,
) -> ApiResult<Json<Vec<BidView>>> {
    let bids = state.db.lock().unwrap().bids_for_vendor(&vendor.id)?;
    Ok(Json(bids))
}

/// PUT /api/bids/{id}
///
/// Sets the bid's status; Accepted forces the parent tender to Awarded.
pub async fn update_bid_status(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBidStatusRequest>,
) -> ApiResult<Json<BidView>> {
    let bid = state.db.lock().unwrap().update_bid_status(&id, req.status)?;
    Ok(Json(bid))
}

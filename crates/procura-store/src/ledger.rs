//! Bid ledger and lifecycle coordination.
//!
//! Submission is gated on the parent tender being Open and on the
//! one-bid-per-(tender, vendor) uniqueness constraint; accepting a bid forces
//! the parent tender to Awarded.

use procura_core::{BidStatus, PortalError, Result, TenderStatus};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::{col_status, constraint_err, docs_from_json, docs_to_json, row_err, DocumentRef, PortalDb};

/// Bid with both references resolved. The tender summary is optional: a
/// deleted tender leaves its bids orphaned and the reference resolves null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    pub id: String,
    pub bid_amount: f64,
    pub proposal: String,
    pub delivery_time: i64,
    pub status: BidStatus,
    pub documents: Vec<DocumentRef>,
    pub vendor: VendorSummary,
    pub tender: Option<TenderSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// Public fields of the bidding vendor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub id: String,
    pub company_name: String,
    pub email: String,
}

/// Summary of the tender a bid targets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub budget: f64,
    pub deadline: String,
    pub status: TenderStatus,
}

/// Fields for bid submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    #[serde(default)]
    pub tender_id: String,
    #[serde(default)]
    pub bid_amount: f64,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub delivery_time: i64,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

impl PortalDb {
    // ── Bid ledger ────────────────────────────────────

    /// Submit a bid for a vendor against an Open tender.
    ///
    /// The vendor's approval status is not checked here; that gate lives in
    /// the client UI.
    pub fn submit_bid(&self, vendor_id: &str, new: &NewBid) -> Result<BidView> {
        let tender_status: TenderStatus = match self.conn.query_row(
            "SELECT status FROM tenders WHERE id=?1",
            params![new.tender_id],
            |row| col_status(row, 0),
        ) {
            Ok(s) => s,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(PortalError::not_found("Tender not found"))
            }
            Err(e) => return Err(PortalError::storage(format!("Get tender: {e}"))),
        };

        if tender_status != TenderStatus::Open {
            return Err(PortalError::invalid_state("Tender is not open for bidding"));
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO bids (id, tender_id, vendor_id, bid_amount, proposal, delivery_time, documents)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)",
                params![
                    id,
                    new.tender_id,
                    vendor_id,
                    new.bid_amount,
                    new.proposal,
                    new.delivery_time,
                    docs_to_json(&new.documents)
                ],
            )
            .map_err(|e| {
                constraint_err(e, "You have already submitted a bid for this tender")
            })?;

        tracing::info!("Bid {id} submitted on tender {}", new.tender_id);
        self.bid_by_id(&id)
    }

    /// Get a bid by ID with references resolved.
    pub fn bid_by_id(&self, id: &str) -> Result<BidView> {
        self.conn
            .query_row(
                &format!("{BID_VIEW_SQL} WHERE b.id=?1"),
                params![id],
                bid_view_row,
            )
            .map_err(|e| row_err(e, "Bid not found"))
    }

    /// All bids by a vendor, newest first.
    pub fn bids_for_vendor(&self, vendor_id: &str) -> Result<Vec<BidView>> {
        self.bid_list("b.vendor_id", vendor_id)
    }

    /// All bids on a tender, newest first.
    pub fn bids_for_tender(&self, tender_id: &str) -> Result<Vec<BidView>> {
        self.bid_list("b.tender_id", tender_id)
    }

    /// Set a bid's status.
    ///
    /// Any member of the closed enum may be set from any prior state; the
    /// ordering of Submitted/Under Review/Accepted/Rejected is not enforced.
    /// Accepting a bid forces the parent tender to Awarded unconditionally,
    /// even if another bid already awarded it.
    pub fn update_bid_status(&self, id: &str, status: BidStatus) -> Result<BidView> {
        let tender_id: String = self
            .conn
            .query_row("SELECT tender_id FROM bids WHERE id=?1", params![id], |row| {
                row.get(0)
            })
            .map_err(|e| row_err(e, "Bid not found"))?;

        self.conn
            .execute(
                "UPDATE bids SET status=?1, updated_at=datetime('now') WHERE id=?2",
                params![status.as_str(), id],
            )
            .map_err(|e| PortalError::storage(format!("Update bid status: {e}")))?;

        if status == BidStatus::Accepted {
            self.force_tender_status(&tender_id, TenderStatus::Awarded)?;
            tracing::info!("Bid {id} accepted; tender {tender_id} awarded");
        }

        self.bid_by_id(id)
    }

    fn bid_list(&self, column: &str, value: &str) -> Result<Vec<BidView>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{BID_VIEW_SQL} WHERE {column}=?1 ORDER BY b.created_at DESC, b.rowid DESC"
            ))
            .map_err(|e| PortalError::storage(format!("Prepare: {e}")))?;

        let bids = stmt
            .query_map(params![value], bid_view_row)
            .map_err(|e| PortalError::storage(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(bids)
    }
}

const BID_VIEW_SQL: &str = "SELECT b.id,b.bid_amount,b.proposal,b.delivery_time,b.status,b.documents,b.created_at,b.updated_at,
        v.id,v.company_name,v.email,
        t.id,t.title,t.category,t.budget,t.deadline,t.status
 FROM bids b
 JOIN vendors v ON v.id = b.vendor_id
 LEFT JOIN tenders t ON t.id = b.tender_id";

fn bid_view_row(row: &Row<'_>) -> rusqlite::Result<BidView> {
    let tender = match row.get::<_, Option<String>>(11)? {
        Some(id) => Some(TenderSummary {
            id,
            title: row.get(12)?,
            category: row.get(13)?,
            budget: row.get(14)?,
            deadline: row.get(15)?,
            status: col_status(row, 16)?,
        }),
        None => None,
    };
    Ok(BidView {
        id: row.get(0)?,
        bid_amount: row.get(1)?,
        proposal: row.get(2)?,
        delivery_time: row.get(3)?,
        status: col_status(row, 4)?,
        documents: docs_from_json(row.get(5)?),
        vendor: VendorSummary {
            id: row.get(8)?,
            company_name: row.get(9)?,
            email: row.get(10)?,
        },
        tender,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NewTender, TenderPatch};
    use std::path::PathBuf;

    fn temp_db() -> PortalDb {
        PortalDb::open(&PathBuf::from(":memory:")).unwrap()
    }

    struct Fixture {
        db: PortalDb,
        vendor_id: String,
        tender_id: String,
    }

    fn fixture() -> Fixture {
        let db = temp_db();
        let admin = db.create_admin("Admin", "admin@eprocurement.com", "h").unwrap();
        let vendor = db.register_vendor("Acme", "a@x.com", "h").unwrap();
        let tender = db
            .create_tender(
                &admin.id,
                &NewTender {
                    title: "Roofing".into(),
                    description: "d".into(),
                    category: "Construction".into(),
                    budget: 1000.0,
                    deadline: "2099-01-01".into(),
                    requirements: None,
                    documents: vec![],
                },
            )
            .unwrap();
        Fixture {
            db,
            vendor_id: vendor.id,
            tender_id: tender.id,
        }
    }

    fn bid_on(tender_id: &str) -> NewBid {
        NewBid {
            tender_id: tender_id.into(),
            bid_amount: 900.0,
            proposal: "p".into(),
            delivery_time: 10,
            documents: vec![],
        }
    }

    #[test]
    fn test_submit_resolves_references() {
        let f = fixture();
        let bid = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();

        assert_eq!(bid.status, BidStatus::Submitted);
        assert_eq!(bid.bid_amount, 900.0);
        assert_eq!(bid.vendor.company_name, "Acme");
        assert_eq!(bid.tender.as_ref().unwrap().title, "Roofing");
    }

    #[test]
    fn test_submit_on_missing_tender() {
        let f = fixture();
        let err = f.db.submit_bid(&f.vendor_id, &bid_on("nope")).unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[test]
    fn test_submit_refused_once_not_open() {
        let f = fixture();
        for status in [TenderStatus::Closed, TenderStatus::Awarded] {
            f.db.force_tender_status(&f.tender_id, status).unwrap();
            let err = f
                .db
                .submit_bid(&f.vendor_id, &bid_on(&f.tender_id))
                .unwrap_err();
            assert!(matches!(err, PortalError::InvalidState(_)), "{status}");
        }
    }

    #[test]
    fn test_second_bid_same_pair_conflicts() {
        let f = fixture();
        f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        let err = f
            .db
            .submit_bid(&f.vendor_id, &bid_on(&f.tender_id))
            .unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));

        // A different vendor may still bid.
        let other = f.db.register_vendor("Other", "o@x.com", "h").unwrap();
        f.db.submit_bid(&other.id, &bid_on(&f.tender_id)).unwrap();
    }

    #[test]
    fn test_accepting_awards_the_tender() {
        let f = fixture();
        let bid = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();

        let updated = f.db.update_bid_status(&bid.id, BidStatus::Accepted).unwrap();
        assert_eq!(updated.status, BidStatus::Accepted);
        assert_eq!(
            f.db.tender_record(&f.tender_id).unwrap().status,
            TenderStatus::Awarded
        );
        // The resolved tender summary reflects the award.
        assert_eq!(
            updated.tender.unwrap().status,
            TenderStatus::Awarded
        );
    }

    #[test]
    fn test_accepting_awards_even_a_closed_tender() {
        let f = fixture();
        let bid = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        f.db.update_tender(
            &f.tender_id,
            &TenderPatch {
                status: Some(TenderStatus::Closed),
                ..TenderPatch::default()
            },
        )
        .unwrap();

        f.db.update_bid_status(&bid.id, BidStatus::Accepted).unwrap();
        assert_eq!(
            f.db.tender_record(&f.tender_id).unwrap().status,
            TenderStatus::Awarded
        );
    }

    #[test]
    fn test_transitions_are_not_order_enforced() {
        let f = fixture();
        let bid = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();

        // Rejected straight from Submitted, then back to Accepted.
        f.db.update_bid_status(&bid.id, BidStatus::Rejected).unwrap();
        let updated = f.db.update_bid_status(&bid.id, BidStatus::Accepted).unwrap();
        assert_eq!(updated.status, BidStatus::Accepted);
    }

    #[test]
    fn test_second_acceptance_rewrites_award() {
        let f = fixture();
        let first = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        let other = f.db.register_vendor("Other", "o@x.com", "h").unwrap();
        let second = f.db.submit_bid(&other.id, &bid_on(&f.tender_id)).unwrap();

        f.db.update_bid_status(&first.id, BidStatus::Accepted).unwrap();
        f.db.update_bid_status(&second.id, BidStatus::Accepted).unwrap();

        // Both bids end up Accepted; the tender stays Awarded.
        assert_eq!(f.db.bid_by_id(&first.id).unwrap().status, BidStatus::Accepted);
        assert_eq!(f.db.bid_by_id(&second.id).unwrap().status, BidStatus::Accepted);
        assert_eq!(
            f.db.tender_record(&f.tender_id).unwrap().status,
            TenderStatus::Awarded
        );
    }

    #[test]
    fn test_update_status_missing_bid() {
        let f = fixture();
        let err = f
            .db
            .update_bid_status("nope", BidStatus::UnderReview)
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[test]
    fn test_vendor_bid_listing_newest_first() {
        let f = fixture();
        let admin = f.db.admin_by_email("admin@eprocurement.com").unwrap().unwrap().0;
        let second_tender = f
            .db
            .create_tender(
                &admin.id,
                &NewTender {
                    title: "Paving".into(),
                    description: "d".into(),
                    category: "Construction".into(),
                    budget: 500.0,
                    deadline: "2099-06-01".into(),
                    requirements: None,
                    documents: vec![],
                },
            )
            .unwrap();

        f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        f.db.submit_bid(&f.vendor_id, &bid_on(&second_tender.id)).unwrap();

        let bids = f.db.bids_for_vendor(&f.vendor_id).unwrap();
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].tender.as_ref().unwrap().title, "Paving");
    }

    #[test]
    fn test_tender_bid_listing_resolves_vendors() {
        let f = fixture();
        f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        let other = f.db.register_vendor("Other", "o@x.com", "h").unwrap();
        f.db.submit_bid(&other.id, &bid_on(&f.tender_id)).unwrap();

        let bids = f.db.bids_for_tender(&f.tender_id).unwrap();
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].vendor.company_name, "Other");
        assert_eq!(bids[1].vendor.company_name, "Acme");
    }

    #[test]
    fn test_orphaned_bid_resolves_null_tender() {
        let f = fixture();
        let bid = f.db.submit_bid(&f.vendor_id, &bid_on(&f.tender_id)).unwrap();
        f.db.delete_tender(&f.tender_id).unwrap();

        let orphan = f.db.bid_by_id(&bid.id).unwrap();
        assert!(orphan.tender.is_none());
        assert_eq!(f.db.bids_for_vendor(&f.vendor_id).unwrap().len(), 1);
    }
}

//! # Procura Store
//!
//! SQLite-backed document store for the e-procurement portal. `PortalDb`
//! wraps a single connection and exposes the credential store (vendors and
//! admins), the tender registry, and the bid ledger. The bid ledger carries
//! the lifecycle rules: bids land only on Open tenders, one bid per
//! (tender, vendor) pair, and accepting a bid awards the parent tender.

pub mod db;
pub mod ledger;
pub mod registry;

pub use db::{Admin, DocumentRef, PortalDb, Vendor};
pub use ledger::{BidView, NewBid, TenderSummary, VendorSummary};
pub use registry::{CreatorSummary, NewTender, Tender, TenderPatch, TenderView};

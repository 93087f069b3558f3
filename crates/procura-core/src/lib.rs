//! # Procura Core
//!
//! Shared foundation for the Procura e-procurement backend: the error
//! taxonomy, the closed status enumerations for vendors, tenders, and bids,
//! and the server configuration.

pub mod config;
pub mod error;
pub mod status;

pub use config::ProcuraConfig;
pub use error::{PortalError, Result};
pub use status::{BidStatus, TenderStatus, VendorStatus};

//! Closed status enumerations for vendors, tenders, and bids.
//!
//! Statuses arrive from clients as strings; deserializing into these enums at
//! the HTTP boundary rejects anything outside the allowed sets before any
//! handler logic runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PortalError;

/// Vendor approval state. Pending on registration; the admin may toggle
/// Approved and Rejected freely afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorStatus {
    Pending,
    Approved,
    Rejected,
}

/// Tender lifecycle state. Open accepts bids; Closed (manual) and Awarded
/// (automatic on bid acceptance) are terminal for bidding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenderStatus {
    Open,
    Closed,
    Awarded,
}

/// Bid review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Submitted,
    #[serde(rename = "Under Review")]
    UnderReview,
    Accepted,
    Rejected,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Awarded => "Awarded",
        }
    }
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under Review",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl FromStr for VendorStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            other => Err(PortalError::validation(format!(
                "Invalid vendor status: {other}"
            ))),
        }
    }
}

impl FromStr for TenderStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "Closed" => Ok(Self::Closed),
            "Awarded" => Ok(Self::Awarded),
            other => Err(PortalError::validation(format!(
                "Invalid tender status: {other}"
            ))),
        }
    }
}

impl FromStr for BidStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(Self::Submitted),
            "Under Review" => Ok(Self::UnderReview),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            other => Err(PortalError::validation(format!("Invalid status: {other}"))),
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_as_str() {
        for s in ["Pending", "Approved", "Rejected"] {
            assert_eq!(s.parse::<VendorStatus>().unwrap().as_str(), s);
        }
        for s in ["Open", "Closed", "Awarded"] {
            assert_eq!(s.parse::<TenderStatus>().unwrap().as_str(), s);
        }
        for s in ["Submitted", "Under Review", "Accepted", "Rejected"] {
            assert_eq!(s.parse::<BidStatus>().unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("Maybe".parse::<VendorStatus>().is_err());
        assert!("open".parse::<TenderStatus>().is_err());
        assert!("UnderReview".parse::<BidStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&BidStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let back: BidStatus = serde_json::from_str("\"Under Review\"").unwrap();
        assert_eq!(back, BidStatus::UnderReview);
    }
}

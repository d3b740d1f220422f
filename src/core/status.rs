//! Status enumerations
//!
//! Applicants move through a five-step pipeline; vacancy requests are
//! simply approved or rejected. A record that arrives without a status is
//! treated as [`DEFAULT_STATUS`] by filtering, counting, typed projections
//! and create defaults, unless its entity's enumeration lacks it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status assumed for records that do not carry one
pub const DEFAULT_STATUS: &str = "pending";

/// Returned when a string is not part of a status enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

/// Recruitment pipeline status of an applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Shortlisted,
    Interviewed,
    Selected,
    Rejected,
}

impl ApplicantStatus {
    pub const ALL: [ApplicantStatus; 5] = [
        ApplicantStatus::Pending,
        ApplicantStatus::Shortlisted,
        ApplicantStatus::Interviewed,
        ApplicantStatus::Selected,
        ApplicantStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "pending",
            ApplicantStatus::Shortlisted => "shortlisted",
            ApplicantStatus::Interviewed => "interviewed",
            ApplicantStatus::Selected => "selected",
            ApplicantStatus::Rejected => "rejected",
        }
    }

    /// Whether no further pipeline step follows
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicantStatus::Selected | ApplicantStatus::Rejected)
    }
}

impl FromStr for ApplicantStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of a vacancy request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(ApplicantStatus::default().as_str(), DEFAULT_STATUS);
        assert_eq!(RequestStatus::default().as_str(), DEFAULT_STATUS);
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in ApplicantStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicantStatus>(), Ok(status));
        }
        let err = "approved".parse::<ApplicantStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'approved'");
        assert_eq!("approved".parse::<RequestStatus>(), Ok(RequestStatus::Approved));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ApplicantStatus::Shortlisted).unwrap();
        assert_eq!(json, "\"shortlisted\"");
    }

    #[test]
    fn test_final_states() {
        assert!(ApplicantStatus::Rejected.is_final());
        assert!(!ApplicantStatus::Interviewed.is_final());
    }
}

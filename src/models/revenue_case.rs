// 💰 Revenue Case - revenue-assurance investigation
//
// Tracks an amount at risk (leakage, billing error, unbilled usage) and
// how much of it has been recovered.

use super::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    RevenueLeakage,
    BillingError,
    ContractMismatch,
    UnbilledUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Investigating,
    PendingApproval,
    Resolved,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Investigating => "investigating",
            CaseStatus::PendingApproval => "pending_approval",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueCase {
    pub id: String,
    pub title: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub severity: Priority,
    pub customer: String,
    pub amount_at_risk: f64,
    pub amount_recovered: f64,
    pub assignee: String,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RevenueCase {
    pub fn outstanding(&self) -> f64 {
        (self.amount_at_risk - self.amount_recovered).max(0.0)
    }

    /// Merge a patch; returns the previous status when it changed
    pub fn apply(&mut self, patch: &RevenueCasePatch) -> Option<CaseStatus> {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone();
        }
        if let Some(recovered) = patch.amount_recovered {
            self.amount_recovered = recovered;
        }

        self.updated_at = Utc::now();

        match patch.status {
            Some(status) if status != self.status => {
                let previous = self.status;
                self.status = status;
                Some(previous)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueCasePatch {
    pub title: Option<String>,
    pub status: Option<CaseStatus>,
    pub severity: Option<Priority>,
    pub assignee: Option<String>,
    pub amount_recovered: Option<f64>,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueCaseFilter {
    pub status: Option<CaseStatus>,
    pub severity: Option<Priority>,
    pub assignee: Option<String>,
    pub search: Option<String>,
}

impl RevenueCaseFilter {
    pub fn matches(&self, case: &RevenueCase) -> bool {
        if self.status.is_some_and(|s| case.status != s) {
            return false;
        }
        if self.severity.is_some_and(|s| case.severity != s) {
            return false;
        }
        if let Some(assignee) = &self.assignee {
            if !case.assignee.eq_ignore_ascii_case(assignee) {
                return false;
            }
        }
        match &self.search {
            Some(search) => {
                let needle = search.to_lowercase();
                case.title.to_lowercase().contains(&needle)
                    || case.customer.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_never_negative() {
        let mut case = RevenueCase {
            id: "rev-1".to_string(),
            title: "Unbilled overage".to_string(),
            case_type: CaseType::UnbilledUsage,
            status: CaseStatus::Open,
            severity: Priority::Medium,
            customer: "Globex".to_string(),
            amount_at_risk: 1200.0,
            amount_recovered: 200.0,
            assignee: "jordan.lee".to_string(),
            opened_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(case.outstanding(), 1000.0);

        let patch = RevenueCasePatch {
            amount_recovered: Some(1500.0),
            status: Some(CaseStatus::Resolved),
            ..Default::default()
        };
        assert_eq!(case.apply(&patch), Some(CaseStatus::Open));
        assert_eq!(case.outstanding(), 0.0);
    }
}

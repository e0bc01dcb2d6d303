// ✅ Close Task - Month-end close checklist item
//
// A close task belongs to one accounting period and one legal entity.
// Status moves freely between values; every status change is audited by
// the registry, not by the task itself.

use super::Priority;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseTaskStatus {
    NotStarted,
    InProgress,
    PendingReview,
    Completed,
    Blocked,
}

impl CloseTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseTaskStatus::NotStarted => "not_started",
            CloseTaskStatus::InProgress => "in_progress",
            CloseTaskStatus::PendingReview => "pending_review",
            CloseTaskStatus::Completed => "completed",
            CloseTaskStatus::Blocked => "blocked",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, CloseTaskStatus::Completed)
    }
}

// ============================================================================
// CLOSE TASK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTask {
    pub id: String,
    pub name: String,
    pub description: String,

    /// Checklist section, e.g. "Cash", "Accruals", "Revenue"
    pub category: String,

    /// Accounting period, "YYYY-MM"
    pub period: String,

    /// Legal entity code
    pub entity: String,

    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,

    pub status: CloseTaskStatus,
    pub priority: Priority,
    pub due_date: NaiveDate,

    /// IDs of tasks that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,

    pub updated_at: DateTime<Utc>,
}

/// Partial update merged into a stored task
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub reviewer: Option<String>,
    pub status: Option<CloseTaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub dependencies: Option<Vec<String>>,

    /// Who made the change (recorded on the audit event)
    pub actor: Option<String>,
}

impl CloseTask {
    /// Merge a patch into this task.
    ///
    /// Returns the previous status when the patch changed it.
    pub fn apply(&mut self, patch: &CloseTaskPatch) -> Option<CloseTaskStatus> {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.clone();
        }
        if let Some(reviewer) = &patch.reviewer {
            self.reviewer = Some(reviewer.clone());
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(dependencies) = &patch.dependencies {
            self.dependencies = dependencies.clone();
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

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_done() && self.due_date < today
    }
}

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTaskFilter {
    pub status: Option<CloseTaskStatus>,
    pub period: Option<String>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CloseTaskFilter {
    pub fn matches(&self, task: &CloseTask) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(period) = &self.period {
            if &task.period != period {
                return false;
            }
        }
        if let Some(owner) = &self.owner {
            if !task.owner.eq_ignore_ascii_case(owner) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !task.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !task.name.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Bulk status update for several tasks at once
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusUpdate {
    pub ids: Vec<String>,
    pub status: CloseTaskStatus,
    pub actor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> CloseTask {
        CloseTask {
            id: "ct-1".to_string(),
            name: "Bank reconciliation".to_string(),
            description: "Reconcile operating account".to_string(),
            category: "Cash".to_string(),
            period: "2025-01".to_string(),
            entity: "US01".to_string(),
            owner: "maria.chen".to_string(),
            reviewer: None,
            status: CloseTaskStatus::NotStarted,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            dependencies: vec![],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_reports_previous_status() {
        let mut t = task();
        let patch = CloseTaskPatch {
            status: Some(CloseTaskStatus::InProgress),
            ..Default::default()
        };

        assert_eq!(t.apply(&patch), Some(CloseTaskStatus::NotStarted));
        assert_eq!(t.status, CloseTaskStatus::InProgress);
    }

    #[test]
    fn test_apply_same_status_is_not_a_change() {
        let mut t = task();
        let patch = CloseTaskPatch {
            status: Some(CloseTaskStatus::NotStarted),
            owner: Some("sam.ortiz".to_string()),
            ..Default::default()
        };

        assert_eq!(t.apply(&patch), None);
        assert_eq!(t.owner, "sam.ortiz");
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let filter = CloseTaskFilter {
            search: Some("OPERATING".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&task()));

        let filter = CloseTaskFilter {
            status: Some(CloseTaskStatus::Completed),
            ..Default::default()
        };
        assert!(!filter.matches(&task()));
    }

    #[test]
    fn test_overdue() {
        let t = task();
        assert!(t.is_overdue(NaiveDate::from_ymd_opt(2025, 2, 4).unwrap()));
        assert!(!t.is_overdue(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()));
    }
}

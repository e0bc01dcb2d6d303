// Domain Models - plain records served by the mock API
//
// Every record type has:
// - A stable string ID
// - A status enum serialized as snake_case
// - A Patch type merged into the stored record
// - A Filter type built from query parameters

pub mod audit;
pub mod binding;
pub mod close_task;
pub mod recon;
pub mod revenue_case;

use serde::{Deserialize, Serialize};

pub use audit::{AuditEvent, AuditLog};
pub use binding::{BindingFilter, BindingStatus, DataTemplateBinding, FieldMapping, NewBinding};
pub use close_task::{BulkStatusUpdate, CloseTask, CloseTaskFilter, CloseTaskPatch, CloseTaskStatus};
pub use recon::{MatchRule, ReconConfig, ReconFilter, ReconPatch, ReconStatus, ReconType};
pub use revenue_case::{CaseStatus, CaseType, RevenueCase, RevenueCaseFilter, RevenueCasePatch};

/// Shared priority / severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

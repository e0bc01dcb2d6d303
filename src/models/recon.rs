// ⚖️ Reconciliation Config - definition of a two-sided reconciliation
//
// A recon config names its two sources, the rules used to pair records,
// and the tolerances within which a pair still counts as matched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconType {
    BankToGl,
    SubledgerToGl,
    Intercompany,
    CashApplication,
}

impl ReconType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconType::BankToGl => "bank_to_gl",
            ReconType::SubledgerToGl => "subledger_to_gl",
            ReconType::Intercompany => "intercompany",
            ReconType::CashApplication => "cash_application",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconStatus {
    Draft,
    Active,
    Paused,
    Archived,
}

impl ReconStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconStatus::Draft => "draft",
            ReconStatus::Active => "active",
            ReconStatus::Paused => "paused",
            ReconStatus::Archived => "archived",
        }
    }
}

/// One pairing rule: source A field compared to source B field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    pub field_a: String,
    pub field_b: String,

    /// "exact", "tolerance", "contains"
    pub comparison: String,
}

impl MatchRule {
    pub fn exact(field_a: &str, field_b: &str) -> Self {
        MatchRule {
            field_a: field_a.to_string(),
            field_b: field_b.to_string(),
            comparison: "exact".to_string(),
        }
    }

    pub fn tolerance(field_a: &str, field_b: &str) -> Self {
        MatchRule {
            field_a: field_a.to_string(),
            field_b: field_b.to_string(),
            comparison: "tolerance".to_string(),
        }
    }
}

// ============================================================================
// RECON CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub recon_type: ReconType,
    pub source_a: String,
    pub source_b: String,
    pub match_rules: Vec<MatchRule>,

    /// Absolute amount difference still treated as a match
    pub tolerance_amount: f64,

    /// Date difference (days) still treated as a match
    pub tolerance_days: u32,

    pub status: ReconStatus,
    pub owner: String,

    /// Share of records matched on the last run (0.0 - 1.0)
    pub match_rate: f64,
    pub unmatched_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub status: Option<ReconStatus>,
    pub match_rules: Option<Vec<MatchRule>>,
    pub tolerance_amount: Option<f64>,
    pub tolerance_days: Option<u32>,
    pub actor: Option<String>,
}

impl ReconConfig {
    /// Merge a patch; returns the previous status when it changed
    pub fn apply(&mut self, patch: &ReconPatch) -> Option<ReconStatus> {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.clone();
        }
        if let Some(rules) = &patch.match_rules {
            self.match_rules = rules.clone();
        }
        if let Some(amount) = patch.tolerance_amount {
            self.tolerance_amount = amount;
        }
        if let Some(days) = patch.tolerance_days {
            self.tolerance_days = days;
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

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconFilter {
    pub status: Option<ReconStatus>,
    #[serde(rename = "type")]
    pub recon_type: Option<ReconType>,
    pub search: Option<String>,
}

impl ReconFilter {
    pub fn matches(&self, recon: &ReconConfig) -> bool {
        if let Some(status) = self.status {
            if recon.status != status {
                return false;
            }
        }
        if let Some(recon_type) = self.recon_type {
            if recon.recon_type != recon_type {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return recon.name.to_lowercase().contains(&needle)
                || recon.source_a.to_lowercase().contains(&needle)
                || recon.source_b.to_lowercase().contains(&needle);
        }
        true
    }
}

// 🔗 Data-Template Binding - maps a template's fields onto a recon or entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,

    /// Optional transform name ("uppercase", "abs", "parse_date")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTemplateBinding {
    pub id: String,
    pub template_id: String,
    pub template_name: String,

    /// "recon" or "entity"
    pub target_type: String,
    pub target_id: String,

    pub field_mappings: Vec<FieldMapping>,
    pub status: BindingStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// POST body for a new binding; checked by `validation::validate_new_binding`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBinding {
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    pub created_by: Option<String>,
}

impl DataTemplateBinding {
    /// Build a binding with a timestamp-based ID
    pub fn from_new(new: NewBinding, now: DateTime<Utc>) -> Self {
        let template_name = new
            .template_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| new.template_id.clone());

        DataTemplateBinding {
            id: format!("binding-{}", now.timestamp_millis()),
            template_id: new.template_id,
            template_name,
            target_type: new.target_type,
            target_id: new.target_id,
            field_mappings: new.field_mappings,
            status: BindingStatus::Active,
            created_by: new.created_by.unwrap_or_else(|| "system".to_string()),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingFilter {
    pub template_id: Option<String>,
    pub target_id: Option<String>,
    pub status: Option<BindingStatus>,
}

impl BindingFilter {
    pub fn matches(&self, binding: &DataTemplateBinding) -> bool {
        self.template_id.as_ref().map_or(true, |t| &binding.template_id == t)
            && self.target_id.as_ref().map_or(true, |t| &binding.target_id == t)
            && self.status.map_or(true, |s| binding.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_new_uses_timestamp_id() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let new = NewBinding {
            template_id: "tpl-bank-stmt".to_string(),
            target_type: "recon".to_string(),
            target_id: "recon-001".to_string(),
            ..Default::default()
        };

        let binding = DataTemplateBinding::from_new(new, now);
        assert_eq!(binding.id, format!("binding-{}", now.timestamp_millis()));
        assert_eq!(binding.template_name, "tpl-bank-stmt");
        assert_eq!(binding.created_by, "system");
        assert_eq!(binding.status, BindingStatus::Active);
    }
}

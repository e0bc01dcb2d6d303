// 📐 Shape Layer - Payload Validation
// Checks create/update payloads before they reach a registry

use crate::models::{CloseTaskPatch, NewBinding, ReconPatch};
use std::collections::HashSet;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

const TARGET_TYPES: [&str; 2] = ["recon", "entity"];

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// SCHEMAS
// ============================================================================

pub fn validate_new_binding(binding: &NewBinding) -> ValidationResult {
    let mut errors = Vec::new();

    if binding.template_id.trim().is_empty() {
        errors.push(ValidationError::new("templateId", "Required field is empty"));
    }

    if binding.target_id.trim().is_empty() {
        errors.push(ValidationError::new("targetId", "Required field is empty"));
    }

    if !TARGET_TYPES.contains(&binding.target_type.as_str()) {
        errors.push(ValidationError::new(
            "targetType",
            "Must be one of: recon, entity",
        ));
    }

    if binding.field_mappings.is_empty() {
        errors.push(ValidationError::new(
            "fieldMappings",
            "At least one field mapping is required",
        ));
    }

    let mut seen = HashSet::new();
    for mapping in &binding.field_mappings {
        if mapping.source_field.trim().is_empty() || mapping.target_field.trim().is_empty() {
            errors.push(ValidationError::new(
                "fieldMappings",
                "Source and target fields must be non-empty",
            ));
        } else if !seen.insert(mapping.target_field.as_str()) {
            errors.push(ValidationError::new(
                "fieldMappings",
                &format!("Target field '{}' is mapped twice", mapping.target_field),
            ));
        }
    }

    finish(errors)
}

pub fn validate_close_task_patch(patch: &CloseTaskPatch) -> ValidationResult {
    let mut errors = Vec::new();

    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.push(ValidationError::new("name", "Cannot be blank"));
    }
    if patch.owner.as_deref().is_some_and(|o| o.trim().is_empty()) {
        errors.push(ValidationError::new("owner", "Cannot be blank"));
    }

    finish(errors)
}

pub fn validate_recon_patch(patch: &ReconPatch) -> ValidationResult {
    let mut errors = Vec::new();

    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.push(ValidationError::new("name", "Cannot be blank"));
    }
    if patch.tolerance_amount.is_some_and(|t| !t.is_finite() || t < 0.0) {
        errors.push(ValidationError::new(
            "toleranceAmount",
            "Must be a non-negative number",
        ));
    }
    if let Some(rules) = &patch.match_rules {
        if rules.is_empty() {
            errors.push(ValidationError::new(
                "matchRules",
                "At least one match rule is required",
            ));
        }
    }

    finish(errors)
}

/// Join errors into one message for an HTTP 400 body
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// TESTS
// ============================================================================

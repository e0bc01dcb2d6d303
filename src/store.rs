// 🗄️ Mock Store - in-memory registries behind the API
//
// Each registry owns one collection plus its audit log. Collections are
// seeded once at startup and mutated in place for the life of the process.
// Lock order inside a registry is always records, then events. Across
// registries, recons are locked before bindings.

use crate::models::{
    AuditEvent, AuditLog, BindingFilter, BulkStatusUpdate, CloseTask, CloseTaskFilter,
    CloseTaskPatch, DataTemplateBinding, NewBinding, ReconConfig, ReconFilter, ReconPatch,
    RevenueCase, RevenueCaseFilter, RevenueCasePatch,
};
use crate::pagination::{paginate, PageParams, Paginated};
use crate::seed;
use crate::sse::QueryResult;
use crate::validation::{self, ValidationError};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("validation failed: {}", validation::describe(.0))]
    Invalid(Vec<ValidationError>),
}

impl StoreError {
    fn not_found(kind: &'static str, id: &str) -> Self {
        debug!(kind, id, "lookup miss");
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A record with its audit trail attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detail<T> {
    #[serde(flatten)]
    pub record: T,
    pub events: Vec<AuditEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateResult {
    pub updated: Vec<CloseTask>,
    pub missing: Vec<String>,
}

// ============================================================================
// CLOSE TASKS
// ============================================================================

pub struct CloseTaskRegistry {
    tasks: RwLock<Vec<CloseTask>>,
    events: RwLock<AuditLog>,
}

impl CloseTaskRegistry {
    pub fn new(tasks: Vec<CloseTask>, events: Vec<AuditEvent>) -> Self {
        CloseTaskRegistry {
            tasks: RwLock::new(tasks),
            events: RwLock::new(AuditLog::from_events(events)),
        }
    }

    pub fn list(&self, filter: &CloseTaskFilter, page: &PageParams) -> Paginated<CloseTask> {
        let mut matched: Vec<CloseTask> = self
            .tasks
            .read()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
        paginate(matched, page)
    }

    pub fn get(&self, id: &str) -> StoreResult<Detail<CloseTask>> {
        let record = self
            .tasks
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("close task", id))?;

        Ok(Detail {
            events: self.events.read().for_entity(id),
            record,
        })
    }

    pub fn patch(&self, id: &str, patch: &CloseTaskPatch) -> StoreResult<Detail<CloseTask>> {
        validation::validate_close_task_patch(patch).map_err(StoreError::Invalid)?;

        {
            let mut tasks = self.tasks.write();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::not_found("close task", id))?;

            if let Some(previous) = task.apply(patch) {
                let event = AuditEvent::status_change(
                    id,
                    patch.actor.as_deref(),
                    previous.as_str(),
                    task.status.as_str(),
                );
                info!(task = id, from = previous.as_str(), to = task.status.as_str(), "close task status changed");
                self.events.write().append(event);
            }
        }

        self.get(id)
    }

    /// Set one status on many tasks; unknown IDs are reported, not fatal
    pub fn bulk_update_status(&self, update: &BulkStatusUpdate) -> BulkUpdateResult {
        let mut updated = Vec::new();
        let mut missing = Vec::new();

        let mut seen = HashSet::new();
        let mut tasks = self.tasks.write();
        for id in update.ids.iter().filter(|id| seen.insert(*id)) {
            let Some(task) = tasks.iter_mut().find(|t| &t.id == id) else {
                missing.push(id.clone());
                continue;
            };

            let patch = CloseTaskPatch {
                status: Some(update.status),
                ..Default::default()
            };
            if let Some(previous) = task.apply(&patch) {
                self.events.write().append(AuditEvent::status_change(
                    id,
                    update.actor.as_deref(),
                    previous.as_str(),
                    task.status.as_str(),
                ));
            }
            updated.push(task.clone());
        }

        info!(updated = updated.len(), missing = missing.len(), status = update.status.as_str(), "bulk close task update");
        BulkUpdateResult { updated, missing }
    }

    pub fn event_count(&self, id: &str) -> usize {
        self.events.read().for_entity(id).len()
    }
}

// ============================================================================
// RECONCILIATIONS
// ============================================================================

pub struct ReconRegistry {
    recons: RwLock<Vec<ReconConfig>>,
    events: RwLock<AuditLog>,
}

impl ReconRegistry {
    pub fn new(recons: Vec<ReconConfig>, events: Vec<AuditEvent>) -> Self {
        ReconRegistry {
            recons: RwLock::new(recons),
            events: RwLock::new(AuditLog::from_events(events)),
        }
    }

    pub fn list(&self, filter: &ReconFilter, page: &PageParams) -> Paginated<ReconConfig> {
        let matched: Vec<ReconConfig> = self
            .recons
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        paginate(matched, page)
    }

    pub fn get(&self, id: &str) -> StoreResult<Detail<ReconConfig>> {
        let record = self
            .recons
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("recon", id))?;

        Ok(Detail {
            events: self.events.read().for_entity(id),
            record,
        })
    }

    pub fn patch(&self, id: &str, patch: &ReconPatch) -> StoreResult<Detail<ReconConfig>> {
        validation::validate_recon_patch(patch).map_err(StoreError::Invalid)?;

        {
            let mut recons = self.recons.write();
            let recon = recons
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::not_found("recon", id))?;

            if let Some(previous) = recon.apply(patch) {
                info!(recon = id, from = previous.as_str(), to = recon.status.as_str(), "recon status changed");
                self.events.write().append(AuditEvent::status_change(
                    id,
                    patch.actor.as_deref(),
                    previous.as_str(),
                    recon.status.as_str(),
                ));
            }
        }

        self.get(id)
    }
}

// ============================================================================
// DATA-TEMPLATE BINDINGS
// ============================================================================

pub struct BindingRegistry {
    bindings: RwLock<Vec<DataTemplateBinding>>,
}

impl BindingRegistry {
    pub fn new(bindings: Vec<DataTemplateBinding>) -> Self {
        BindingRegistry {
            bindings: RwLock::new(bindings),
        }
    }

    pub fn list(&self, filter: &BindingFilter, page: &PageParams) -> Paginated<DataTemplateBinding> {
        let matched: Vec<DataTemplateBinding> = self
            .bindings
            .read()
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        paginate(matched, page)
    }

    pub fn create(&self, new: NewBinding) -> StoreResult<DataTemplateBinding> {
        validation::validate_new_binding(&new).map_err(StoreError::Invalid)?;

        let mut bindings = self.bindings.write();
        let mut binding = DataTemplateBinding::from_new(new, Utc::now());

        // Two creates inside the same millisecond would share an ID
        let base = binding.id.clone();
        let mut suffix = 1;
        while bindings.iter().any(|b| b.id == binding.id) {
            binding.id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        info!(binding = %binding.id, template = %binding.template_id, target = %binding.target_id, "binding created");
        bindings.push(binding.clone());
        Ok(binding)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

// ============================================================================
// REVENUE CASES
// ============================================================================

pub struct RevenueCaseRegistry {
    cases: RwLock<Vec<RevenueCase>>,
    events: RwLock<AuditLog>,
}

impl RevenueCaseRegistry {
    pub fn new(cases: Vec<RevenueCase>, events: Vec<AuditEvent>) -> Self {
        RevenueCaseRegistry {
            cases: RwLock::new(cases),
            events: RwLock::new(AuditLog::from_events(events)),
        }
    }

    /// Highest severity first, then largest outstanding amount
    pub fn list(&self, filter: &RevenueCaseFilter, page: &PageParams) -> Paginated<RevenueCase> {
        let mut matched: Vec<RevenueCase> = self
            .cases
            .read()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.outstanding().total_cmp(&a.outstanding()))
        });
        paginate(matched, page)
    }

    pub fn get(&self, id: &str) -> StoreResult<Detail<RevenueCase>> {
        let record = self
            .cases
            .read()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("revenue case", id))?;

        Ok(Detail {
            events: self.events.read().for_entity(id),
            record,
        })
    }

    pub fn patch(&self, id: &str, patch: &RevenueCasePatch) -> StoreResult<Detail<RevenueCase>> {
        {
            let mut cases = self.cases.write();
            let case = cases
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::not_found("revenue case", id))?;

            if let Some(previous) = case.apply(patch) {
                info!(case = id, from = previous.as_str(), to = case.status.as_str(), "revenue case status changed");
                self.events.write().append(AuditEvent::status_change(
                    id,
                    patch.actor.as_deref(),
                    previous.as_str(),
                    case.status.as_str(),
                ));
            }
        }

        self.get(id)
    }
}

// ============================================================================
// QUERY RESULTS
// ============================================================================

/// Results kept before the oldest is evicted
pub const MAX_QUERY_RESULTS: usize = 500;

#[derive(Default)]
struct StoredResults {
    by_id: HashMap<String, QueryResult>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// Full payloads for completed streaming queries, keyed by query ID
pub struct QueryResultRegistry {
    capacity: usize,
    results: RwLock<StoredResults>,
}

impl QueryResultRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        QueryResultRegistry {
            capacity: capacity.max(1),
            results: RwLock::new(StoredResults::default()),
        }
    }

    pub fn insert(&self, result: QueryResult) {
        let mut results = self.results.write();
        let query_id = result.query_id.clone();
        if results.by_id.insert(query_id.clone(), result).is_none() {
            results.order.push_back(query_id);
        }

        while results.order.len() > self.capacity {
            if let Some(oldest) = results.order.pop_front() {
                debug!(query_id = %oldest, "evicting query result");
                results.by_id.remove(&oldest);
            }
        }
    }

    pub fn get(&self, query_id: &str) -> StoreResult<QueryResult> {
        self.results
            .read()
            .by_id
            .get(query_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("query result", query_id))
    }

    pub fn len(&self) -> usize {
        self.results.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.read().order.is_empty()
    }
}

impl Default for QueryResultRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_QUERY_RESULTS)
    }
}

// ============================================================================
// MOCK STORE
// ============================================================================

pub struct MockStore {
    pub close_tasks: CloseTaskRegistry,
    pub recons: ReconRegistry,
    pub bindings: BindingRegistry,
    pub revenue_cases: RevenueCaseRegistry,
    pub query_results: QueryResultRegistry,
}

impl MockStore {
    /// Store loaded with the seed data
    pub fn seeded() -> Self {
        MockStore {
            close_tasks: CloseTaskRegistry::new(seed::close_tasks(), seed::close_task_events()),
            recons: ReconRegistry::new(seed::recons(), seed::recon_events()),
            bindings: BindingRegistry::new(seed::bindings()),
            revenue_cases: RevenueCaseRegistry::new(seed::revenue_cases(), seed::revenue_case_events()),
            query_results: QueryResultRegistry::default(),
        }
    }

    pub fn empty() -> Self {
        MockStore {
            close_tasks: CloseTaskRegistry::new(Vec::new(), Vec::new()),
            recons: ReconRegistry::new(Vec::new(), Vec::new()),
            bindings: BindingRegistry::new(Vec::new()),
            revenue_cases: RevenueCaseRegistry::new(Vec::new(), Vec::new()),
            query_results: QueryResultRegistry::default(),
        }
    }
}

impl MockStore {
    /// Create a binding; a `recon` target must name an existing recon
    pub fn create_binding(&self, new: NewBinding) -> StoreResult<DataTemplateBinding> {
        // Recons stay read-locked through the insert
        let recons = self.recons.recons.read();
        let unknown_recon = new.target_type == "recon"
            && !new.target_id.trim().is_empty()
            && !recons.iter().any(|r| r.id == new.target_id);
        if unknown_recon {
            return Err(StoreError::Invalid(vec![ValidationError::new(
                "targetId",
                &format!("recon '{}' does not exist", new.target_id),
            )]));
        }

        self.bindings.create(new)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::seeded()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseStatus, CloseTaskStatus, FieldMapping, ReconStatus};

    #[test]
    fn test_status_patch_appends_exactly_one_event() {
        let store = MockStore::seeded();
        let before = store.close_tasks.event_count("task-004");

        let patch = CloseTaskPatch {
            status: Some(CloseTaskStatus::InProgress),
            actor: Some("jordan.lee@acme.com".to_string()),
            ..Default::default()
        };
        let detail = store.close_tasks.patch("task-004", &patch).unwrap();

        assert_eq!(detail.record.status, CloseTaskStatus::InProgress);
        assert_eq!(detail.events.len(), before + 1);

        let event = detail.events.last().unwrap();
        assert_eq!(event.actor, "jordan.lee@acme.com");
        assert_eq!(event.event_type, "status_change");
        assert_eq!(event.to_status.as_deref(), Some("in_progress"));
        assert!(event.created_at <= Utc::now());
    }

    #[test]
    fn test_non_status_patch_appends_no_event() {
        let store = MockStore::seeded();
        let before = store.close_tasks.event_count("task-004");

        let patch = CloseTaskPatch {
            owner: Some("sam.ortiz@acme.com".to_string()),
            ..Default::default()
        };
        let detail = store.close_tasks.patch("task-004", &patch).unwrap();

        assert_eq!(detail.record.owner, "sam.ortiz@acme.com");
        assert_eq!(detail.events.len(), before);
    }

    #[test]
    fn test_patch_unknown_task_is_not_found() {
        let store = MockStore::seeded();
        let err = store
            .close_tasks
            .patch("task-999", &CloseTaskPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_list_filters_then_paginates() {
        let store = MockStore::seeded();
        let filter = CloseTaskFilter {
            category: Some("cash".to_string()),
            ..Default::default()
        };

        let page = store.close_tasks.list(&filter, &PageParams::new(1, 2));
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.items.len(), 2);

        let page = store.close_tasks.list(&filter, &PageParams::new(2, 2));
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_bulk_update_reports_missing() {
        let store = MockStore::seeded();
        let update = BulkStatusUpdate {
            ids: vec!["task-004".to_string(), "task-404".to_string(), "task-009".to_string()],
            status: CloseTaskStatus::InProgress,
            actor: None,
        };

        let result = store.close_tasks.bulk_update_status(&update);
        assert_eq!(result.updated.len(), 2);
        assert_eq!(result.missing, vec!["task-404".to_string()]);
        assert_eq!(store.close_tasks.event_count("task-009"), 1);
    }

    #[test]
    fn test_bulk_update_ignores_repeated_ids() {
        let store = MockStore::seeded();
        let update = BulkStatusUpdate {
            ids: vec![
                "task-004".to_string(),
                "task-404".to_string(),
                "task-004".to_string(),
                "task-404".to_string(),
            ],
            status: CloseTaskStatus::InProgress,
            actor: None,
        };

        let result = store.close_tasks.bulk_update_status(&update);
        assert_eq!(result.updated.len(), 1);
        assert_eq!(result.updated[0].id, "task-004");
        assert_eq!(result.missing, vec!["task-404".to_string()]);
    }

    #[test]
    fn test_recon_patch_audit_and_validation() {
        let store = MockStore::seeded();
        let patch = ReconPatch {
            status: Some(ReconStatus::Active),
            ..Default::default()
        };
        let detail = store.recons.patch("recon-004", &patch).unwrap();
        assert_eq!(detail.record.status, ReconStatus::Active);
        assert_eq!(detail.events.last().unwrap().actor, "system");

        let bad = ReconPatch {
            match_rules: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            store.recons.patch("recon-004", &bad),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_binding_create_and_reject() {
        let store = MockStore::seeded();
        let before = store.bindings.len();

        let new = NewBinding {
            template_id: "tpl-bank-stmt".to_string(),
            target_type: "recon".to_string(),
            target_id: "recon-003".to_string(),
            field_mappings: vec![FieldMapping {
                source_field: "Amount".to_string(),
                target_field: "amount".to_string(),
                transform: None,
            }],
            ..Default::default()
        };
        let first = store.bindings.create(new.clone()).unwrap();
        let second = store.bindings.create(new).unwrap();
        assert!(first.id.starts_with("binding-"));
        assert_ne!(first.id, second.id);
        assert_eq!(store.bindings.len(), before + 2);

        assert!(matches!(
            store.bindings.create(NewBinding::default()),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(store.bindings.len(), before + 2);
    }

    #[test]
    fn test_binding_to_unknown_recon_is_rejected() {
        let store = MockStore::seeded();
        let before = store.bindings.len();
        let mapping = FieldMapping {
            source_field: "Amount".to_string(),
            target_field: "amount".to_string(),
            transform: None,
        };

        let err = store
            .create_binding(NewBinding {
                template_id: "tpl-bank-stmt".to_string(),
                target_type: "recon".to_string(),
                target_id: "recon-999".to_string(),
                field_mappings: vec![mapping.clone()],
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: targetId: recon 'recon-999' does not exist"
        );
        assert_eq!(store.bindings.len(), before);

        let created = store
            .create_binding(NewBinding {
                template_id: "tpl-entity-map".to_string(),
                target_type: "entity".to_string(),
                target_id: "acme-us".to_string(),
                field_mappings: vec![mapping],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(created.target_id, "acme-us");
        assert_eq!(store.bindings.len(), before + 1);
    }

    fn result(query_id: &str) -> QueryResult {
        QueryResult {
            query_id: query_id.to_string(),
            prompt: "close status".to_string(),
            data_analysis: "3 of 12 close tasks are complete".to_string(),
            follow_up_prompts: vec![],
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_query_results_evict_oldest() {
        let results = QueryResultRegistry::with_capacity(2);
        results.insert(result("q-1"));
        results.insert(result("q-2"));
        results.insert(result("q-2"));
        assert_eq!(results.len(), 2);

        results.insert(result("q-3"));
        assert_eq!(results.len(), 2);
        assert!(matches!(results.get("q-1"), Err(StoreError::NotFound { .. })));
        assert!(results.get("q-2").is_ok());
        assert!(results.get("q-3").is_ok());
    }

    #[test]
    fn test_revenue_cases_sorted_by_severity() {
        let store = MockStore::seeded();
        let page = store
            .revenue_cases
            .list(&RevenueCaseFilter::default(), &PageParams::default());
        assert_eq!(page.items[0].id, "case-003");

        let patch = RevenueCasePatch {
            status: Some(CaseStatus::Investigating),
            actor: Some("priya.nair@acme.com".to_string()),
            ..Default::default()
        };
        let detail = store.revenue_cases.patch("case-003", &patch).unwrap();
        assert_eq!(detail.events.len(), 1);
    }
}

// 📜 Audit Trail - append-only event log per entity
//
// Events are never edited or removed. A registry owns one AuditLog and
// appends a status_change event whenever a patch moves a record's status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTOR: &str = "system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub entity_id: String,

    /// "created", "status_change", "comment"
    pub event_type: String,

    pub actor: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(entity_id: &str, event_type: &str, actor: &str, message: String) -> Self {
        AuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            entity_id: entity_id.to_string(),
            event_type: event_type.to_string(),
            actor: actor.to_string(),
            message,
            from_status: None,
            to_status: None,
            created_at: Utc::now(),
        }
    }

    pub fn status_change(entity_id: &str, actor: Option<&str>, from: &str, to: &str) -> Self {
        let actor = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_ACTOR);

        let mut event = AuditEvent::new(
            entity_id,
            "status_change",
            actor,
            format!("Status changed from {} to {}", from, to),
        );
        event.from_status = Some(from.to_string());
        event.to_status = Some(to.to_string());
        event
    }

    /// Backdate the event (seed data)
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

// ============================================================================
// AUDIT LOG
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new() -> Self {
        AuditLog { events: Vec::new() }
    }

    pub fn from_events(events: Vec<AuditEvent>) -> Self {
        AuditLog { events }
    }

    pub fn append(&mut self, event: AuditEvent) {
        self.events.push(event);
    }

    /// Events for one entity, oldest first
    pub fn for_entity(&self, entity_id: &str) -> Vec<AuditEvent> {
        let mut events: Vec<AuditEvent> = self
            .events
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.created_at);
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_change_defaults_actor() {
        let event = AuditEvent::status_change("ct-1", None, "not_started", "in_progress");
        assert_eq!(event.actor, DEFAULT_ACTOR);
        assert_eq!(event.event_type, "status_change");
        assert_eq!(event.from_status.as_deref(), Some("not_started"));
        assert_eq!(event.to_status.as_deref(), Some("in_progress"));

        let blank = AuditEvent::status_change("ct-1", Some("  "), "a", "b");
        assert_eq!(blank.actor, DEFAULT_ACTOR);
    }

    #[test]
    fn test_for_entity_sorted_oldest_first() {
        let now = Utc::now();
        let mut log = AuditLog::new();
        log.append(AuditEvent::new("x", "comment", "a", "second".into()).at(now));
        log.append(AuditEvent::new("y", "comment", "a", "other".into()));
        log.append(
            AuditEvent::new("x", "created", "a", "first".into()).at(now - Duration::hours(1)),
        );

        let events = log.for_entity("x");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[1].message, "second");
    }
}

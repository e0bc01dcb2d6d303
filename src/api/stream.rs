// 🛰️ Demo Query Stream - synthesizes an SSE query run over the mock store
//
// The "analysis" is a summary of the in-memory data for the topic the
// prompt mentions. The full result is stored before `query_complete` goes
// out so the client's follow-up fetch always finds it.

use crate::models::{
    CaseStatus, CloseTaskFilter, CloseTaskStatus, ReconFilter, ReconStatus, RevenueCaseFilter,
};
use crate::pagination::{PageParams, MAX_PAGE_SIZE};
use crate::sse::{EventType, QueryResult, StreamEvent};
use crate::store::MockStore;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct StreamRequest {
    #[serde(default)]
    pub prompt: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Close,
    Reconciliation,
    Revenue,
    Overview,
}

impl Topic {
    pub fn detect(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        if ["close", "task", "checklist"].iter().any(|k| prompt.contains(k)) {
            Topic::Close
        } else if ["recon", "match", "cash"].iter().any(|k| prompt.contains(k)) {
            Topic::Reconciliation
        } else if ["revenue", "case", "leak", "billing"].iter().any(|k| prompt.contains(k)) {
            Topic::Revenue
        } else {
            Topic::Overview
        }
    }

    fn tool(&self) -> &'static str {
        match self {
            Topic::Close => "close_task_lookup",
            Topic::Reconciliation => "recon_lookup",
            Topic::Revenue => "revenue_case_lookup",
            Topic::Overview => "overview_lookup",
        }
    }
}

/// A planned stream: events in order, plus the result to publish
#[derive(Debug, Clone)]
pub struct DemoRun {
    pub events: Vec<StreamEvent>,
    pub result: Option<QueryResult>,
}

impl DemoRun {
    pub fn plan(request: &StreamRequest, store: &MockStore) -> Self {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return DemoRun {
                events: vec![StreamEvent::new(EventType::Error).with_message("Prompt is required")],
                result: None,
            };
        }

        let query_id = uuid::Uuid::new_v4().to_string();
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let topic = Topic::detect(prompt);
        let (data_analysis, follow_up_prompts) = analyze(topic, store);

        let mut connected = StreamEvent::new(EventType::Connected)
            .with_message("Connected")
            .with_query_id(query_id.as_str());
        connected.session_id = Some(session_id);
        connected.thread_id = Some(uuid::Uuid::new_v4().to_string());

        let mut tool_start = StreamEvent::new(EventType::ToolStart)
            .with_message(format!("Running {}", topic.tool()));
        tool_start
            .extra
            .insert("tool".to_string(), Value::String(topic.tool().to_string()));

        let events = vec![
            connected,
            StreamEvent::new(EventType::Thinking).with_message(format!("Analyzing: {}", prompt)),
            tool_start,
            StreamEvent::new(EventType::AgentFinish).with_message("Analysis ready"),
            StreamEvent::new(EventType::QueryComplete)
                .with_message("Query complete")
                .with_query_id(query_id.as_str()),
        ];

        DemoRun {
            events,
            result: Some(QueryResult {
                query_id,
                prompt: prompt.to_string(),
                data_analysis,
                follow_up_prompts,
                completed_at: Utc::now(),
            }),
        }
    }
}

fn all() -> PageParams {
    PageParams::new(1, MAX_PAGE_SIZE)
}

fn analyze(topic: Topic, store: &MockStore) -> (String, Vec<String>) {
    match topic {
        Topic::Close => {
            let tasks = store.close_tasks.list(&CloseTaskFilter::default(), &all()).items;
            let done = tasks.iter().filter(|t| t.status == CloseTaskStatus::Completed).count();
            let blocked = tasks.iter().filter(|t| t.status == CloseTaskStatus::Blocked).count();
            let today = Utc::now().date_naive();
            let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
            (
                format!(
                    "{} of {} close tasks are complete; {} blocked, {} overdue.",
                    done,
                    tasks.len(),
                    blocked,
                    overdue
                ),
                vec![
                    "Which tasks are blocked?".to_string(),
                    "Who owns the remaining tasks?".to_string(),
                ],
            )
        }
        Topic::Reconciliation => {
            let filter = ReconFilter {
                status: Some(ReconStatus::Active),
                ..Default::default()
            };
            let recons = store.recons.list(&filter, &all()).items;
            let unmatched: u32 = recons.iter().map(|r| r.unmatched_count).sum();
            let worst = recons
                .iter()
                .min_by(|a, b| a.match_rate.total_cmp(&b.match_rate))
                .map(|r| format!(" Lowest match rate: {} at {:.1}%.", r.name, r.match_rate * 100.0))
                .unwrap_or_default();
            (
                format!(
                    "{} active reconciliations with {} unmatched items.{}",
                    recons.len(),
                    unmatched,
                    worst
                ),
                vec![
                    "Show unmatched items for the worst recon".to_string(),
                    "Which tolerances should be reviewed?".to_string(),
                ],
            )
        }
        Topic::Revenue => {
            let cases = store.revenue_cases.list(&RevenueCaseFilter::default(), &all()).items;
            let open: Vec<_> = cases
                .iter()
                .filter(|c| !matches!(c.status, CaseStatus::Resolved | CaseStatus::Closed))
                .collect();
            let at_risk: f64 = open.iter().map(|c| c.outstanding()).sum();
            (
                format!(
                    "{} open revenue cases with ${:.2} outstanding.",
                    open.len(),
                    at_risk
                ),
                vec![
                    "Which customers have the largest exposure?".to_string(),
                    "What has been recovered this month?".to_string(),
                ],
            )
        }
        Topic::Overview => {
            let tasks = store.close_tasks.list(&CloseTaskFilter::default(), &all());
            let recons = store.recons.list(&ReconFilter::default(), &all());
            let cases = store.revenue_cases.list(&RevenueCaseFilter::default(), &all());
            (
                format!(
                    "Tracking {} close tasks, {} reconciliations and {} revenue cases.",
                    tasks.pagination.total, recons.pagination.total, cases.pagination.total
                ),
                vec![
                    "How is the close progressing?".to_string(),
                    "Where is revenue at risk?".to_string(),
                ],
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> StreamRequest {
        StreamRequest {
            prompt: prompt.to_string(),
            session_id: None,
        }
    }

    #[test]
    fn test_topic_detection() {
        assert_eq!(Topic::detect("How is the January close going?"), Topic::Close);
        assert_eq!(Topic::detect("unmatched cash items"), Topic::Reconciliation);
        assert_eq!(Topic::detect("Revenue leakage by customer"), Topic::Revenue);
        assert_eq!(Topic::detect("hello"), Topic::Overview);
    }

    #[test]
    fn test_plan_shape() {
        let store = MockStore::seeded();
        let run = DemoRun::plan(&request("close status"), &store);

        let kinds: Vec<EventType> = run.events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.first(), Some(&EventType::Connected));
        assert_eq!(kinds.last(), Some(&EventType::QueryComplete));

        let result = run.result.unwrap();
        assert_eq!(run.events[0].query_id.as_deref(), Some(result.query_id.as_str()));
        assert!(result.data_analysis.contains("3 of 12 close tasks are complete"));
    }

    #[test]
    fn test_session_id_is_reused() {
        let store = MockStore::seeded();
        let mut req = request("recon health");
        req.session_id = Some("session-42".to_string());

        let run = DemoRun::plan(&req, &store);
        assert_eq!(run.events[0].session_id.as_deref(), Some("session-42"));
    }

    #[test]
    fn test_empty_prompt_is_a_single_error() {
        let run = DemoRun::plan(&request("   "), &MockStore::seeded());
        assert_eq!(run.events.len(), 1);
        assert_eq!(run.events[0].kind(), EventType::Error);
        assert!(run.result.is_none());
    }
}

// Query-progress events carried on the SSE stream

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    /// Handshake; carries the session/thread/query IDs
    Connected,
    Thinking,
    ToolStart,
    AgentFinish,
    QueryComplete,
    FinalResult,
    Error,
    Cancelled,
    /// Anything else is passed through untouched
    Other(String),
}

impl EventType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "connected" => EventType::Connected,
            "thinking" => EventType::Thinking,
            "tool_start" => EventType::ToolStart,
            "agent_finish" => EventType::AgentFinish,
            "query_complete" => EventType::QueryComplete,
            "final_result" => EventType::FinalResult,
            "error" => EventType::Error,
            "cancelled" => EventType::Cancelled,
            other => EventType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Connected => "connected",
            EventType::Thinking => "thinking",
            EventType::ToolStart => "tool_start",
            EventType::AgentFinish => "agent_finish",
            EventType::QueryComplete => "query_complete",
            EventType::FinalResult => "final_result",
            EventType::Error => "error",
            EventType::Cancelled => "cancelled",
            EventType::Other(tag) => tag,
        }
    }

    /// Ends the query: no further events are expected
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventType::QueryComplete | EventType::FinalResult | EventType::Error | EventType::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_prompts: Option<Vec<String>>,

    /// Fields this schema does not name (tool names, timings)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamEvent {
    pub fn new(event_type: EventType) -> Self {
        StreamEvent {
            event_type: event_type.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    pub fn kind(&self) -> EventType {
        EventType::parse(&self.event_type)
    }
}

/// Full payload of a completed query, fetched after `query_complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_id: String,
    pub prompt: String,
    pub data_analysis: String,
    #[serde(default)]
    pub follow_up_prompts: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

// Query lifecycle state exposed to callers

use crate::sse::{QueryResult, StreamEvent};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

/// Snapshot of one client's query
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryState {
    /// Every event received except the `connected` handshake
    pub events: Vec<StreamEvent>,
    pub status: ConnectionStatus,
    pub is_loading: bool,
    pub error: Option<String>,

    pub query_id: Option<String>,
    /// Kept across queries so follow-ups land in the same session
    pub session_id: Option<String>,
    pub thread_id: Option<String>,

    pub result: Option<QueryResult>,
}

impl QueryState {
    /// Clear per-query fields; the session survives
    pub(crate) fn reset(&mut self) {
        let session_id = self.session_id.take();
        *self = QueryState {
            session_id,
            ..Default::default()
        };
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = ConnectionStatus::Error;
        self.error = Some(message.into());
        self.is_loading = false;
    }

    pub(crate) fn finish(&mut self) {
        if self.status != ConnectionStatus::Error {
            self.status = ConnectionStatus::Disconnected;
        }
        self.is_loading = false;
    }
}

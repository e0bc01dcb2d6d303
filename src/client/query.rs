// Query orchestration: one in-flight stream per client
//
// Lifecycle: disconnected → connecting → connected → (disconnected | error)
//
// A new query cancels the previous one and bumps the generation counter.
// Every state write checks the generation first, so a stream that is still
// unwinding after cancellation can never touch the newer query's state.

use super::state::{ConnectionStatus, QueryState};
use super::ClientError;
use crate::sse::{EventDecoder, EventType, QueryResult, StreamEvent};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ClientError>> + Send>>;

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// ============================================================================
// TRANSPORT
// ============================================================================

#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    /// Start the query; resolves once the response headers have arrived
    async fn open_stream(&self, request: &QueryRequest) -> Result<ByteStream, ClientError>;

    /// Full result payload of a completed query
    async fn fetch_result(&self, query_id: &str) -> Result<QueryResult, ClientError>;
}

// ============================================================================
// CLIENT
// ============================================================================

struct Inner {
    state: QueryState,
    generation: u64,
    cancel: Option<CancellationToken>,
}

enum Flow {
    Continue,
    Stop,
}

pub struct StreamingQueryClient<T> {
    transport: Arc<T>,
    inner: Arc<Mutex<Inner>>,
}

impl<T> Clone for StreamingQueryClient<T> {
    fn clone(&self) -> Self {
        StreamingQueryClient {
            transport: Arc::clone(&self.transport),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: QueryTransport> StreamingQueryClient<T> {
    pub fn new(transport: T) -> Self {
        StreamingQueryClient {
            transport: Arc::new(transport),
            inner: Arc::new(Mutex::new(Inner {
                state: QueryState::default(),
                generation: 0,
                cancel: None,
            })),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> QueryState {
        self.inner.lock().state.clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.lock().state.status
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().state.is_loading
    }

    /// Run one query to completion (or cancellation).
    ///
    /// Transport failures are recorded in the state and returned as `Err`.
    /// An `error` event from the server is not a transport failure: it ends
    /// the query with status `error` and the call still returns `Ok`.
    pub async fn send_query(&self, prompt: &str) -> Result<QueryState, ClientError> {
        let (generation, token, request) = {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.cancel.take() {
                debug!("aborting in-flight query");
                previous.cancel();
            }

            inner.generation += 1;
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());

            inner.state.reset();
            inner.state.status = ConnectionStatus::Connecting;
            inner.state.is_loading = true;

            let request = QueryRequest {
                prompt: prompt.to_string(),
                session_id: inner.state.session_id.clone(),
            };
            (inner.generation, token, request)
        };

        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(self.state()),
            opened = self.transport.open_stream(&request) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "failed to open query stream");
                self.update(generation, |s| s.fail(e.to_string()));
                self.release(generation);
                return Err(e);
            }
        };

        if !self.update(generation, |s| s.status = ConnectionStatus::Connected) {
            return Ok(self.state());
        }

        let mut decoder = EventDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(self.state()),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for event in decoder.decode(&chunk) {
                        match self.dispatch(generation, &token, event).await {
                            Ok(Flow::Continue) => {}
                            Ok(Flow::Stop) => {
                                self.release(generation);
                                return Ok(self.state());
                            }
                            Err(e) => {
                                self.release(generation);
                                return Err(e);
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "query stream failed");
                    self.update(generation, |s| s.fail(e.to_string()));
                    self.release(generation);
                    return Err(e);
                }
                None => break,
            }
        }

        // Stream ended: whatever is still buffered is a final line
        if let Some(event) = decoder.finish() {
            if let Err(e) = self.dispatch(generation, &token, event).await {
                self.release(generation);
                return Err(e);
            }
        }

        self.update(generation, QueryState::finish);
        self.release(generation);
        Ok(self.state())
    }

    /// Abort the in-flight query, if any, and force `disconnected`
    pub fn cancel_query(&self) {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.cancel.take() {
            token.cancel();
            info!("query cancelled");
        }
        inner.generation += 1;
        inner.state.status = ConnectionStatus::Disconnected;
        inner.state.is_loading = false;
    }

    async fn dispatch(
        &self,
        generation: u64,
        token: &CancellationToken,
        event: StreamEvent,
    ) -> Result<Flow, ClientError> {
        let kind = event.kind();
        debug!(event_type = kind.as_str(), "stream event");

        if kind == EventType::Connected {
            let live = self.update(generation, |s| {
                if event.session_id.is_some() {
                    s.session_id = event.session_id.clone();
                }
                if event.thread_id.is_some() {
                    s.thread_id = event.thread_id.clone();
                }
                if event.query_id.is_some() {
                    s.query_id = event.query_id.clone();
                }
            });
            return Ok(if live { Flow::Continue } else { Flow::Stop });
        }

        let message = event.message.clone();
        let live = self.update(generation, |s| {
            if event.query_id.is_some() {
                s.query_id = event.query_id.clone();
            }
            s.events.push(event);
        });
        if !live {
            return Ok(Flow::Stop);
        }

        match kind {
            EventType::QueryComplete | EventType::FinalResult => {
                let query_id = self.inner.lock().state.query_id.clone();

                match query_id {
                    Some(query_id) => {
                        let fetched = tokio::select! {
                            biased;
                            _ = token.cancelled() => return Ok(Flow::Stop),
                            fetched = self.transport.fetch_result(&query_id) => fetched,
                        };

                        match fetched {
                            Ok(result) => {
                                info!(query_id = %query_id, "query complete");
                                self.update(generation, |s| s.result = Some(result));
                            }
                            Err(e) => {
                                warn!(error = %e, query_id = %query_id, "failed to fetch query result");
                                self.update(generation, |s| s.fail(e.to_string()));
                                return Err(e);
                            }
                        }
                    }
                    None => warn!("completion event without a query id; nothing to fetch"),
                }

                self.update(generation, QueryState::finish);
            }
            EventType::Error => {
                let message = message.unwrap_or_else(|| "Unknown error".to_string());
                warn!(error = %message, "server reported query error");
                self.update(generation, |s| s.fail(message));
            }
            EventType::Cancelled => {
                self.update(generation, QueryState::finish);
            }
            _ => {}
        }

        Ok(if kind.is_terminal() {
            Flow::Stop
        } else {
            Flow::Continue
        })
    }

    /// Apply `f` only if `generation` is still the current query
    fn update<F: FnOnce(&mut QueryState)>(&self, generation: u64, f: F) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        f(&mut inner.state);
        true
    }

    fn release(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.cancel = None;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures_util::stream;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Script {
        chunks: Vec<Vec<u8>>,
        hang: bool,
        broken: bool,
    }

    #[derive(Default)]
    struct FakeTransport {
        scripts: Mutex<VecDeque<Script>>,
        fail_open: bool,
        fail_fetch: bool,
        fetches: AtomicUsize,
        /// Client state seen from inside `fetch_result`
        watched: Mutex<Option<Arc<Mutex<Inner>>>>,
        seen_at_fetch: Mutex<Vec<(bool, ConnectionStatus)>>,
    }

    impl FakeTransport {
        fn with(chunks: Vec<Vec<u8>>) -> Self {
            let fake = FakeTransport::default();
            fake.push(chunks, false);
            fake
        }

        fn push(&self, chunks: Vec<Vec<u8>>, hang: bool) {
            self.scripts.lock().push_back(Script {
                chunks,
                hang,
                ..Default::default()
            });
        }

        fn watch<T>(client: &StreamingQueryClient<T>) -> Arc<Mutex<Inner>> {
            Arc::clone(&client.inner)
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QueryTransport for FakeTransport {
        async fn open_stream(&self, _request: &QueryRequest) -> Result<ByteStream, ClientError> {
            if self.fail_open {
                return Err(ClientError::Status {
                    status: 502,
                    url: "http://test/api/sse".to_string(),
                });
            }

            let script = self.scripts.lock().pop_front().unwrap_or_default();
            let chunks = stream::iter(script.chunks.into_iter().map(Ok::<Vec<u8>, ClientError>));
            let stream: ByteStream = if script.hang {
                Box::pin(chunks.chain(stream::pending()))
            } else if script.broken {
                let reset = ClientError::Stream("connection reset".to_string());
                Box::pin(chunks.chain(stream::once(async move { Err(reset) })))
            } else {
                Box::pin(chunks)
            };
            Ok(stream)
        }

        async fn fetch_result(&self, query_id: &str) -> Result<QueryResult, ClientError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(inner) = self.watched.lock().as_ref() {
                let inner = inner.lock();
                self.seen_at_fetch
                    .lock()
                    .push((inner.state.is_loading, inner.state.status));
            }
            if self.fail_fetch {
                return Err(ClientError::Status {
                    status: 404,
                    url: format!("http://test/api/query/{}/result", query_id),
                });
            }
            Ok(QueryResult {
                query_id: query_id.to_string(),
                prompt: "test".to_string(),
                data_analysis: "Unapplied cash is $12,400".to_string(),
                follow_up_prompts: vec!["Show by customer".to_string()],
                completed_at: Utc::now(),
            })
        }
    }

    fn frame(json: &str) -> Vec<u8> {
        format!("data: {}\n\n", json).into_bytes()
    }

    async fn wait_for_status<T: QueryTransport>(
        client: &StreamingQueryClient<T>,
        status: ConnectionStatus,
    ) {
        for _ in 0..200 {
            if client.status() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("client never reached {:?}", status);
    }

    #[tokio::test]
    async fn test_every_event_except_connected_is_logged() {
        let chunks = vec![
            frame(r#"{"event_type":"connected","session_id":"s-1","thread_id":"t-1","query_id":"q-1"}"#),
            frame(r#"{"event_type":"thinking","message":"Reading lockbox"}"#),
            frame(r#"{"event_type":"tool_start","message":"sql"}"#),
            frame(r#"{"event_type":"progress","percent":50}"#),
            frame(r#"{"event_type":"agent_finish"}"#),
            frame(r#"{"event_type":"query_complete","query_id":"q-1"}"#),
        ];
        let client = StreamingQueryClient::new(FakeTransport::with(chunks));

        let state = client.send_query("unapplied cash?").await.unwrap();

        let kinds: Vec<&str> = state.events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, vec!["thinking", "tool_start", "progress", "agent_finish", "query_complete"]);
        assert_eq!(state.session_id.as_deref(), Some("s-1"));
        assert_eq!(state.thread_id.as_deref(), Some("t-1"));
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(!state.is_loading);
        assert_eq!(state.result.unwrap().query_id, "q-1");
    }

    #[tokio::test]
    async fn test_completion_fetches_result_exactly_once() {
        let mut chunk = frame(r#"{"event_type":"query_complete","query_id":"q-7"}"#);
        chunk.extend(frame(r#"{"event_type":"final_result","query_id":"q-7"}"#));
        let client = StreamingQueryClient::new(FakeTransport::with(vec![chunk]));
        *client.transport().watched.lock() = Some(FakeTransport::watch(&client));

        let state = client.send_query("close status").await.unwrap();

        assert_eq!(client.transport().fetches(), 1);
        assert_eq!(
            *client.transport().seen_at_fetch.lock(),
            vec![(true, ConnectionStatus::Connected)]
        );
        assert!(!state.is_loading);
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.result.is_some());
    }

    #[tokio::test]
    async fn test_failed_result_fetch_releases_query() {
        let fake = FakeTransport {
            fail_fetch: true,
            ..Default::default()
        };
        fake.push(vec![frame(r#"{"event_type":"query_complete","query_id":"q-3"}"#)], false);
        let client = StreamingQueryClient::new(fake);

        let err = client.send_query("q").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));

        let state = client.state();
        assert_eq!(state.status, ConnectionStatus::Error);
        assert!(!state.is_loading);
        assert!(client.inner.lock().cancel.is_none());
    }

    #[tokio::test]
    async fn test_interrupted_stream_is_reported() {
        let fake = FakeTransport::default();
        fake.scripts.lock().push_back(Script {
            chunks: vec![frame(r#"{"event_type":"thinking"}"#)],
            broken: true,
            ..Default::default()
        });
        let client = StreamingQueryClient::new(fake);

        let err = client.send_query("q").await.unwrap_err();
        assert!(matches!(err, ClientError::Stream(_)));

        let state = client.state();
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.status, ConnectionStatus::Error);
        assert_eq!(state.error.as_deref(), Some("stream interrupted: connection reset"));
        assert!(client.inner.lock().cancel.is_none());
    }

    #[tokio::test]
    async fn test_final_result_uses_query_id_from_handshake() {
        let chunks = vec![
            frame(r#"{"event_type":"connected","query_id":"q-9"}"#),
            frame(r#"{"event_type":"final_result"}"#),
        ];
        let client = StreamingQueryClient::new(FakeTransport::with(chunks));

        let state = client.send_query("q").await.unwrap();
        assert_eq!(client.transport().fetches(), 1);
        assert_eq!(state.result.unwrap().query_id, "q-9");
    }

    #[tokio::test]
    async fn test_error_event_sets_error_status() {
        let chunks = vec![
            frame(r#"{"event_type":"thinking"}"#),
            frame(r#"{"event_type":"error","message":"Agent timed out"}"#),
            frame(r#"{"event_type":"thinking"}"#),
        ];
        let client = StreamingQueryClient::new(FakeTransport::with(chunks));

        let state = client.send_query("q").await.unwrap();

        assert_eq!(state.status, ConnectionStatus::Error);
        assert_eq!(state.error.as_deref(), Some("Agent timed out"));
        assert_eq!(state.events.len(), 2);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_cancelled_event_disconnects() {
        let chunks = vec![frame(r#"{"event_type":"cancelled","message":"Stopped by user"}"#)];
        let client = StreamingQueryClient::new(FakeTransport::with(chunks));

        let state = client.send_query("q").await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.events.len(), 1);
        assert_eq!(client.transport().fetches(), 0);
    }

    #[tokio::test]
    async fn test_split_line_yields_one_event() {
        let line = frame(r#"{"event_type":"tool_start","message":"fetch_invoices"}"#);
        let (a, b) = line.split_at(17);
        let client = StreamingQueryClient::new(FakeTransport::with(vec![a.to_vec(), b.to_vec()]));

        let state = client.send_query("q").await.unwrap();
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].message.as_deref(), Some("fetch_invoices"));
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_flushed() {
        let chunks = vec![
            frame(r#"{"event_type":"thinking"}"#),
            br#"data: {"event_type":"agent_finish"}"#.to_vec(),
        ];
        let client = StreamingQueryClient::new(FakeTransport::with(chunks));

        let state = client.send_query("q").await.unwrap();
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_cancel_query_forces_disconnected() {
        let fake = FakeTransport::default();
        fake.push(vec![frame(r#"{"event_type":"thinking"}"#)], true);
        let client = StreamingQueryClient::new(fake);

        let running = client.clone();
        let handle = tokio::spawn(async move { running.send_query("q").await });

        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert!(client.is_loading());

        client.cancel_query();

        let state = client.state();
        assert!(!state.is_loading);
        assert_eq!(state.status, ConnectionStatus::Disconnected);

        handle.await.unwrap().unwrap();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_harmless() {
        let client = StreamingQueryClient::new(FakeTransport::default());
        client.cancel_query();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_new_query_supersedes_running_one() {
        let fake = FakeTransport::default();
        fake.push(vec![frame(r#"{"event_type":"thinking","message":"first"}"#)], true);
        fake.push(
            vec![
                frame(r#"{"event_type":"thinking","message":"second"}"#),
                frame(r#"{"event_type":"query_complete","query_id":"q-2"}"#),
            ],
            false,
        );
        let client = StreamingQueryClient::new(fake);

        let running = client.clone();
        let first = tokio::spawn(async move { running.send_query("first").await });
        wait_for_status(&client, ConnectionStatus::Connected).await;

        let state = client.send_query("second").await.unwrap();
        first.await.unwrap().unwrap();

        let messages: Vec<_> = state.events.iter().filter_map(|e| e.message.as_deref()).collect();
        assert_eq!(messages, vec!["second"]);
        assert_eq!(client.state().result.unwrap().query_id, "q-2");
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let fake = FakeTransport {
            fail_open: true,
            ..Default::default()
        };
        let client = StreamingQueryClient::new(fake);

        let err = client.send_query("q").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 502, .. }));

        let state = client.state();
        assert_eq!(state.status, ConnectionStatus::Error);
        assert!(!state.is_loading);
        assert!(state.error.unwrap().contains("502"));
    }
}

// ============================================================================
// API Handlers
// ============================================================================
//
// Every list route follows the same steps: parse query params, filter the
// in-memory collection, paginate, return the envelope. Detail routes attach
// the record's audit events.

use super::response::{ok, ApiError, ApiResponse, ApiResult};
use super::stream::{DemoRun, StreamRequest};
use crate::models::{
    BindingFilter, BulkStatusUpdate, CloseTask, CloseTaskFilter, CloseTaskPatch,
    DataTemplateBinding, NewBinding, ReconConfig, ReconFilter, ReconPatch, RevenueCase,
    RevenueCaseFilter, RevenueCasePatch,
};
use crate::pagination::{PageParams, Paginated};
use crate::sse::{EventType, QueryResult};
use crate::store::{BulkUpdateResult, Detail, MockStore};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MockStore>,

    /// Pause before each demo stream event
    pub stream_delay: Duration,
}

impl AppState {
    pub fn new(store: MockStore, stream_delay: Duration) -> Self {
        AppState {
            store: Arc::new(store),
            stream_delay,
        }
    }
}

type Params<T> = Result<Query<T>, QueryRejection>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// GET /api/health - Health check
pub async fn health_check() -> ApiResult<&'static str> {
    ok("OK")
}

// ---------------------------------------------------------------------------
// Close tasks
// ---------------------------------------------------------------------------

/// GET /api/close/tasks
pub async fn list_close_tasks(
    State(state): State<AppState>,
    filter: Params<CloseTaskFilter>,
    page: Params<PageParams>,
) -> ApiResult<Paginated<CloseTask>> {
    let Query(filter) = filter?;
    let Query(page) = page?;
    ok(state.store.close_tasks.list(&filter, &page))
}

/// PATCH /api/close/tasks - bulk status update
pub async fn bulk_update_close_tasks(
    State(state): State<AppState>,
    body: Body<BulkStatusUpdate>,
) -> ApiResult<BulkUpdateResult> {
    let Json(update) = body?;
    if update.ids.is_empty() {
        return Err(ApiError::BadRequest("ids must not be empty".to_string()));
    }
    ok(state.store.close_tasks.bulk_update_status(&update))
}

/// GET /api/close/tasks/:id
pub async fn get_close_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Detail<CloseTask>> {
    ok(state.store.close_tasks.get(&id)?)
}

/// PATCH /api/close/tasks/:id
pub async fn patch_close_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body<CloseTaskPatch>,
) -> ApiResult<Detail<CloseTask>> {
    let Json(patch) = body?;
    ok(state.store.close_tasks.patch(&id, &patch)?)
}

// ---------------------------------------------------------------------------
// Reconciliations
// ---------------------------------------------------------------------------

/// GET /api/recons
pub async fn list_recons(
    State(state): State<AppState>,
    filter: Params<ReconFilter>,
    page: Params<PageParams>,
) -> ApiResult<Paginated<ReconConfig>> {
    let Query(filter) = filter?;
    let Query(page) = page?;
    ok(state.store.recons.list(&filter, &page))
}

/// GET /api/recons/:id
pub async fn get_recon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Detail<ReconConfig>> {
    ok(state.store.recons.get(&id)?)
}

/// PATCH /api/recons/:id
pub async fn patch_recon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body<ReconPatch>,
) -> ApiResult<Detail<ReconConfig>> {
    let Json(patch) = body?;
    ok(state.store.recons.patch(&id, &patch)?)
}

// ---------------------------------------------------------------------------
// Data-template bindings
// ---------------------------------------------------------------------------

/// GET /api/data-templates/bindings
pub async fn list_bindings(
    State(state): State<AppState>,
    filter: Params<BindingFilter>,
    page: Params<PageParams>,
) -> ApiResult<Paginated<DataTemplateBinding>> {
    let Query(filter) = filter?;
    let Query(page) = page?;
    ok(state.store.bindings.list(&filter, &page))
}

/// POST /api/data-templates/bindings
pub async fn create_binding(
    State(state): State<AppState>,
    body: Body<NewBinding>,
) -> Result<(StatusCode, Json<ApiResponse<DataTemplateBinding>>), ApiError> {
    let Json(new) = body?;
    let binding = state.store.create_binding(new)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(binding))))
}

// ---------------------------------------------------------------------------
// Revenue cases
// ---------------------------------------------------------------------------

/// GET /api/revenue-cases
pub async fn list_revenue_cases(
    State(state): State<AppState>,
    filter: Params<RevenueCaseFilter>,
    page: Params<PageParams>,
) -> ApiResult<Paginated<RevenueCase>> {
    let Query(filter) = filter?;
    let Query(page) = page?;
    ok(state.store.revenue_cases.list(&filter, &page))
}

/// GET /api/revenue-cases/:id
pub async fn get_revenue_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Detail<RevenueCase>> {
    ok(state.store.revenue_cases.get(&id)?)
}

/// PATCH /api/revenue-cases/:id
pub async fn patch_revenue_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body<RevenueCasePatch>,
) -> ApiResult<Detail<RevenueCase>> {
    let Json(patch) = body?;
    ok(state.store.revenue_cases.patch(&id, &patch)?)
}

// ---------------------------------------------------------------------------
// Streaming queries
// ---------------------------------------------------------------------------

/// POST /api/sse - demo query stream
pub async fn stream_query(
    State(state): State<AppState>,
    body: Body<StreamRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let Json(request) = body?;
    let DemoRun { events, result } = DemoRun::plan(&request, &state.store);
    info!(events = events.len(), query_id = ?result.as_ref().map(|r| r.query_id.as_str()), "streaming demo query");

    let store = Arc::clone(&state.store);
    let delay = state.stream_delay;

    let stream = stream::iter(events).then(move |event| {
        let store = Arc::clone(&store);
        let result = result.clone();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if event.kind() == EventType::QueryComplete {
                if let Some(result) = result {
                    store.query_results.insert(result);
                }
            }
            Event::default().json_data(&event)
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/query/:id/result
pub async fn get_query_result(
    State(state): State<AppState>,
    Path(query_id): Path<String>,
) -> ApiResult<QueryResult> {
    ok(state.store.query_results.get(&query_id)?)
}

// 🌐 REST API - axum router over the mock store

pub mod handlers;
pub mod response;
pub mod routes;
pub mod stream;

pub use handlers::AppState;
pub use response::{ApiError, ApiResponse, ApiResult};
pub use routes::create_router;
pub use stream::{DemoRun, StreamRequest, Topic};

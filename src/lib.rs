// Finance Ops Back Office - Core Library
// Exposes the mock API, the streaming query client and shared models

pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod seed;
pub mod sse;
pub mod store;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use client::{ClientError, ConnectionStatus, QueryState, QueryTransport, StreamingQueryClient};
#[cfg(feature = "client")]
pub use client::HttpTransport;
pub use config::Config;
pub use models::{
    AuditEvent, CloseTask, CloseTaskStatus, DataTemplateBinding, Priority, ReconConfig,
    ReconStatus, ReconType, RevenueCase,
};
pub use pagination::{paginate, PageInfo, PageParams, Paginated};
pub use sse::{EventDecoder, EventType, LineBuffer, QueryResult, StreamEvent};
pub use store::{Detail, MockStore, StoreError};
pub use validation::{ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

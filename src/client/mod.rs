// 📡 Streaming Query Client
//
// Sends one prompt to the SSE query endpoint, follows the event stream and
// keeps a snapshot of the query's lifecycle for whoever is displaying it.

#[cfg(feature = "client")]
pub mod http;
pub mod query;
pub mod state;

#[cfg(feature = "client")]
pub use http::HttpTransport;
pub use query::{ByteStream, QueryRequest, QueryTransport, StreamingQueryClient};
pub use state::{ConnectionStatus, QueryState};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[cfg(feature = "client")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("server error: {0}")]
    Api(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

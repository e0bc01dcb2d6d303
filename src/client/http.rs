// HTTP transport for the streaming query client

use super::query::{ByteStream, QueryRequest, QueryTransport};
use super::ClientError;
use crate::sse::QueryResult;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

/// Response envelope used by every JSON route of the API
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpTransport { http, base_url }
    }

    pub fn stream_url(&self) -> String {
        format!("{}/api/sse", self.base_url)
    }

    pub fn result_url(&self, query_id: &str) -> String {
        format!(
            "{}/api/query/{}/result",
            self.base_url,
            urlencoding::encode(query_id)
        )
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn open_stream(&self, request: &QueryRequest) -> Result<ByteStream, ClientError> {
        let url = self.stream_url();
        debug!(url = %url, "opening query stream");

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let stream: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| {
                    chunk
                        .map(|bytes| bytes.to_vec())
                        .map_err(|e| ClientError::Stream(e.to_string()))
                }),
        );
        Ok(stream)
    }

    async fn fetch_result(&self, query_id: &str) -> Result<QueryResult, ClientError> {
        let url = self.result_url(query_id);
        debug!(url = %url, "fetching query result");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let envelope: Envelope<QueryResult> = response.json().await.map_err(|e| {
            if status.is_success() {
                ClientError::from(e)
            } else {
                ClientError::Status {
                    status: status.as_u16(),
                    url: url.clone(),
                }
            }
        })?;

        match envelope {
            Envelope {
                success: true,
                data: Some(result),
                ..
            } => Ok(result),
            Envelope { error, .. } => Err(ClientError::Api(
                error.unwrap_or_else(|| format!("HTTP {} with no result", status.as_u16())),
            )),
        }
    }
}

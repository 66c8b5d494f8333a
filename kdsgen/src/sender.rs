//! The transport sender.
//!
//! Posts serialized messages to the ingest endpoint. A request that is
//! completed at the network layer is a success whatever its HTTP status; only
//! a request that cannot be issued or completed is an error. Nothing here
//! retries.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Url, header::CONTENT_TYPE};
use tracing::debug;

/// Errors produced by [`Transport`] implementations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// Error making HTTP request
    #[error("Failed to send HTTP request to {uri}: {source}")]
    RequestFailed {
        /// Target URI
        uri: String,
        /// Underlying reqwest error
        #[source]
        source: Box<reqwest::Error>,
    },
}

#[async_trait]
/// Delivery of a serialized message to the ingest endpoint.
pub trait Transport: Send + Sync {
    /// Deliver `body`, blocking the caller until delivery completes or fails.
    async fn send(&self, body: Bytes) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
/// A [`Transport`] that POSTs JSON bodies over HTTP(S).
///
/// Clones share a single connection pool.
pub struct HttpSender {
    client: reqwest::Client,
    uri: Url,
}

impl HttpSender {
    /// Create a new [`HttpSender`] for `uri`, keeping up to `idle_connections`
    /// pooled connections open.
    ///
    /// # Errors
    ///
    /// Function will return an error if the TLS backend cannot be initialized.
    pub fn new(uri: Url, idle_connections: usize) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(idle_connections)
            .build()?;
        Ok(Self { client, uri })
    }
}

#[async_trait]
impl Transport for HttpSender {
    async fn send(&self, body: Bytes) -> Result<(), Error> {
        let request_failed = |source| Error::RequestFailed {
            uri: self.uri.to_string(),
            source: Box::new(source),
        };

        let block_length = body.len();
        let response = self
            .client
            .post(self.uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        // Drain the response so the connection returns to the pool.
        response.bytes().await.map_err(request_failed)?;
        debug!(%status, block_length, "message posted");
        Ok(())
    }
}

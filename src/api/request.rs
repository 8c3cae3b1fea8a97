use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use super::activity::{ActivityGuard, NetworkActivity};

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Why a request produced nothing.
///
/// Loaders only log these; the caller sees an empty list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    #[error("Response too large")]
    ResponseTooLarge,
    /// Body was not a well-formed envelope
    #[error("Unexpected response body")]
    Parse,
}

/// Completion message of a loader request.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// Generation returned by the `load` call that issued the request.
    pub generation: u64,
    /// Parsed items; empty on any failure.
    pub items: Vec<T>,
}

/// One in-flight request slot shared by the loaders.
///
/// Issuing a request aborts the previous task and bumps the generation, so a
/// completion that was already queued before the abort can still be told
/// apart from the current one.
pub(crate) struct RequestSlot<T> {
    client: reqwest::Client,
    activity: Arc<dyn NetworkActivity>,
    completions: mpsc::UnboundedSender<Loaded<T>>,
    timeout: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> RequestSlot<T> {
    pub(crate) fn new(
        client: reqwest::Client,
        activity: Arc<dyn NetworkActivity>,
        completions: mpsc::UnboundedSender<Loaded<T>>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            activity,
            completions,
            timeout,
            generation: 0,
            task: None,
        }
    }

    /// Start a GET for `url`, replacing any request still in flight.
    ///
    /// `label` only identifies the request in logs; the URL may carry the
    /// API key and is never logged.
    pub(crate) fn issue(
        &mut self,
        url: Url,
        label: String,
        parse: fn(&[u8]) -> Option<Vec<T>>,
    ) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let guard = ActivityGuard::start(Arc::clone(&self.activity));
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        let client = self.client.clone();
        let tx = self.completions.clone();
        let timeout = self.timeout;

        tracing::debug!(request = %label, generation, "Issuing request");

        self.task = Some(tokio::spawn(async move {
            let result = fetch_body(&client, url, timeout)
                .await
                .and_then(|bytes| parse(&bytes).ok_or(FetchError::Parse));
            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(request = %label, error = %e, "Request failed");
                    Vec::new()
                }
            };

            // The response is in; the activity window closes before delivery.
            drop(guard);

            tracing::debug!(request = %label, generation, count = items.len(), "Request complete");
            if tx.send(Loaded { generation, items }).is_err() {
                tracing::debug!(request = %label, "Completion receiver dropped");
            }
        }));

        generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T> Drop for RequestSlot<T> {
    fn drop(&mut self) {
        // Aborting drops the task's ActivityGuard, which signals `end`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn fetch_body(
    client: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)??;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    tokio::time::timeout(timeout, read_limited_bytes(response, MAX_RESPONSE_SIZE))
        .await
        .map_err(|_| FetchError::Timeout)?
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

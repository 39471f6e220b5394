//! JSON-RPC transport.
//!
//! The [`Transport`] trait is the wire seam: it takes a fully-formed
//! request envelope and an advisory cancellation token, and returns the
//! raw JSON-RPC reply. [`HttpTransport`] is the reqwest-backed
//! implementation; tests substitute in-memory recorders.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;

/// JSON-RPC 2.0 request envelope.
#[derive(Clone, Debug, Serialize)]
pub struct RequestEnvelope {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

impl RequestEnvelope {
    pub fn new(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// Raw JSON-RPC reply: either a result or an error object.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Clone, Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// The wire seam.
///
/// The transport alone decides how to honor the cancellation token;
/// callers treat it as advisory. No retries happen at this layer.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestEnvelope,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResponse, RpcError>>;
}

/// HTTP JSON-RPC transport over reqwest.
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &RequestEnvelope) -> Result<RawResponse, RpcError> {
        tracing::debug!(method = %request.method, id = request.id, "sending rpc request");

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });
            return Err(RpcError::Transport {
                message,
                status: Some(status.as_u16()),
            });
        }

        let raw: RawResponse = serde_json::from_str(&body)?;
        Ok(raw)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: RequestEnvelope,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResponse, RpcError>> {
        Box::pin(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(RpcError::Cancelled),
                result = self.post(&request) => result,
            }
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .finish()
    }
}

/// Pull a human-readable message out of an error body, if it carries
/// one in a recognizable place.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(error) = value.get("error") {
        if let Some(message) = error.as_str() {
            return Some(message.to_string());
        }
        if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
    }
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(String::from)
}

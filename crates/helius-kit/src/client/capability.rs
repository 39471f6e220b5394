//! The RPC capability surface.
//!
//! A capability maps a method name and parameters to either an
//! already-resolved value or a [`DeferredRequest`]: a staged request
//! that goes over the wire only when executed. Decorators
//! ([`CustomMethodRegistry`](super::CustomMethodRegistry),
//! [`DispatchProxy`](super::DispatchProxy)) layer over a base
//! capability without changing this contract.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;

use super::transport::{RequestEnvelope, Transport};

/// Monotonic request ids, shared across all staged requests.
static REQUEST_ID: AtomicU64 = AtomicU64::new(0);

fn next_request_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Outcome of staging a call against a capability.
#[derive(Clone, Debug)]
pub enum CallOutcome {
    /// The capability produced the value directly; nothing to send.
    Resolved(Value),
    /// A staged request that must be executed to produce a value.
    Deferred(DeferredRequest),
}

/// A staged, not-yet-sent JSON-RPC request.
///
/// Execution is lazy and NOT idempotent: every call to
/// [`execute`](Self::execute) issues a fresh wire request with a fresh
/// id. No deduplication or caching happens here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeferredRequest {
    method: String,
    params: Value,
}

impl DeferredRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// The method this request will invoke.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The already-shaped parameters this request will carry.
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Send the request through `transport` and return the response's
    /// `result` field.
    ///
    /// The cancellation token is threaded through to the transport,
    /// which alone decides how to honor it.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        cancel: CancellationToken,
    ) -> Result<Value, RpcError> {
        let request = RequestEnvelope::new(next_request_id(), &self.method, self.params.clone());
        let raw = transport.send(request, cancel).await?;

        if let Some(error) = raw.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        raw.result
            .ok_or_else(|| RpcError::InvalidResponse("missing result in response".to_string()))
    }

    /// Execute and deserialize the result.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        transport: &dyn Transport,
        cancel: CancellationToken,
    ) -> Result<T, RpcError> {
        let value = self.execute(transport, cancel).await?;
        serde_json::from_value(value).map_err(RpcError::Json)
    }
}

/// A set of named RPC operations.
///
/// This replaces a dynamic "wrap any method by name" proxy with an
/// explicit seam: implementations stage a call for any method they
/// know, and report membership through [`contains`](Self::contains).
pub trait RpcCapability: Send + Sync {
    /// Stage a call. The returned outcome is either a resolved value or
    /// a deferred request the caller must execute.
    fn stage(&self, method: &str, params: Value) -> Result<CallOutcome, RpcError>;

    /// Whether this capability knows the method.
    fn contains(&self, method: &str) -> bool;
}

/// The plain JSON-RPC surface: stages any method name as a standard
/// positional-params request, deciding nothing about its shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseRpc;

impl RpcCapability for BaseRpc {
    fn stage(&self, method: &str, params: Value) -> Result<CallOutcome, RpcError> {
        Ok(CallOutcome::Deferred(DeferredRequest::new(method, params)))
    }

    fn contains(&self, _method: &str) -> bool {
        true
    }
}

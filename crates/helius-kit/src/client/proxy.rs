//! Dispatch proxy: the resolved calling surface.
//!
//! [`DispatchProxy`] turns the staged capability world into plain
//! calls: `invoke(method, params)` consults an overrides map first,
//! then stages against the wrapped base and — when the outcome is a
//! deferred request — runs its completion step exactly once and hands
//! back the result. Resolved values come back untouched, with no
//! transport traffic. Errors from overrides, staging, or execution
//! propagate unchanged; nothing is caught or rewrapped here.
//!
//! Overrides are supplied at construction through
//! [`DispatchProxyBuilder`]; once built, the proxy is immutable.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;

use super::capability::{CallOutcome, RpcCapability};
use super::transport::Transport;

/// An override handler: takes the raw parameters, returns the value the
/// caller sees. Permanently shadows the base for its name.
pub type OverrideFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync>;

/// Decorator that auto-executes deferred requests and honors per-name
/// overrides.
pub struct DispatchProxy {
    base: Arc<dyn RpcCapability>,
    transport: Arc<dyn Transport>,
    overrides: HashMap<String, OverrideFn>,
}

impl DispatchProxy {
    /// Wrap a capability with no overrides.
    pub fn new(base: Arc<dyn RpcCapability>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base,
            transport,
            overrides: HashMap::new(),
        }
    }

    /// Start building a proxy with overrides.
    pub fn builder(base: Arc<dyn RpcCapability>, transport: Arc<dyn Transport>) -> DispatchProxyBuilder {
        DispatchProxyBuilder {
            base,
            transport,
            overrides: HashMap::new(),
        }
    }

    /// Invoke a method and resolve its result.
    pub async fn invoke(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.invoke_with(method, params, CancellationToken::new())
            .await
    }

    /// Invoke with an explicit cancellation token. The token is
    /// advisory and only reaches the transport for deferred outcomes.
    pub async fn invoke_with(
        &self,
        method: &str,
        params: Value,
        cancel: CancellationToken,
    ) -> Result<Value, RpcError> {
        if let Some(handler) = self.overrides.get(method) {
            return handler(params).await;
        }

        match self.base.stage(method, params)? {
            CallOutcome::Resolved(value) => Ok(value),
            CallOutcome::Deferred(request) => {
                request.execute(self.transport.as_ref(), cancel).await
            }
        }
    }

    /// Invoke and deserialize the result.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let value = self.invoke(method, params).await?;
        serde_json::from_value(value).map_err(RpcError::Json)
    }

    /// Whether an override or the base knows the method.
    pub fn contains(&self, method: &str) -> bool {
        self.overrides.contains_key(method) || self.base.contains(method)
    }
}

impl std::fmt::Debug for DispatchProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.overrides.keys().collect();
        names.sort();
        f.debug_struct("DispatchProxy")
            .field("overrides", &names)
            .finish()
    }
}

/// Builder for [`DispatchProxy`].
pub struct DispatchProxyBuilder {
    base: Arc<dyn RpcCapability>,
    transport: Arc<dyn Transport>,
    overrides: HashMap<String, OverrideFn>,
}

impl DispatchProxyBuilder {
    /// Register an override for `method`. The override shadows the base
    /// for that name on every invoke; the base is never consulted.
    pub fn override_method<F>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync + 'static,
    {
        self.overrides.insert(method.into(), Arc::new(handler));
        self
    }

    /// Register a pre-wrapped override handler.
    pub fn override_with(mut self, method: impl Into<String>, handler: OverrideFn) -> Self {
        self.overrides.insert(method.into(), handler);
        self
    }

    pub fn build(self) -> DispatchProxy {
        DispatchProxy {
            base: self.base,
            transport: self.transport,
            overrides: self.overrides,
        }
    }
}

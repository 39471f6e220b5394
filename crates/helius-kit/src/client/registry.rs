//! Provider-specific method registry.
//!
//! Helius exposes methods that are not part of the generic Solana
//! JSON-RPC surface (DAS asset queries, priority-fee estimation).
//! [`CustomMethodRegistry`] injects them into any [`RpcCapability`]
//! without forking it: names in its descriptor table are staged with
//! the descriptor's parameter shaping, everything else passes through
//! to the wrapped base untouched.
//!
//! The table is fixed at construction; there is deliberately no way to
//! add or remove descriptors afterwards, so protocol-level methods can
//! never be shadowed by accident.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RpcError;

use super::capability::{CallOutcome, DeferredRequest, RpcCapability};

/// Reshapes raw caller parameters into the wire parameter value.
pub type ParamConverter = fn(Value) -> Result<Value, RpcError>;

/// How one provider-specific method shapes its parameters.
#[derive(Clone)]
pub struct MethodDescriptor {
    /// Wire method name.
    pub method: &'static str,
    /// Wrap the (converted) parameters in a one-element array before
    /// transmission. Some endpoints always expect positional params,
    /// even for a single structured argument.
    pub array_wrap: bool,
    /// Optional parameter reshaping, applied before wrapping.
    pub convert: Option<ParamConverter>,
}

impl MethodDescriptor {
    /// A method whose parameters go over the wire as given.
    pub const fn new(method: &'static str) -> Self {
        Self {
            method,
            array_wrap: false,
            convert: None,
        }
    }

    /// A method whose parameters are wrapped in a one-element array.
    pub const fn array_wrapped(method: &'static str) -> Self {
        Self {
            method,
            array_wrap: true,
            convert: None,
        }
    }

    /// Attach a parameter converter.
    pub const fn with_converter(mut self, convert: ParamConverter) -> Self {
        self.convert = Some(convert);
        self
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("method", &self.method)
            .field("array_wrap", &self.array_wrap)
            .field("has_converter", &self.convert.is_some())
            .finish()
    }
}

/// Decorator that adds a fixed table of provider methods to a base
/// capability.
pub struct CustomMethodRegistry {
    base: Arc<dyn RpcCapability>,
    methods: HashMap<&'static str, MethodDescriptor>,
}

impl CustomMethodRegistry {
    /// Build a registry over `base` with the given descriptor table.
    pub fn new(
        base: Arc<dyn RpcCapability>,
        descriptors: impl IntoIterator<Item = MethodDescriptor>,
    ) -> Self {
        Self {
            base,
            methods: descriptors.into_iter().map(|d| (d.method, d)).collect(),
        }
    }

    /// Build a registry preloaded with the Helius method table.
    pub fn with_helius_methods(base: Arc<dyn RpcCapability>) -> Self {
        Self::new(base, helius_method_table())
    }

    /// Look up the descriptor for a method, if it is registered.
    pub fn descriptor(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods.get(method)
    }
}

impl RpcCapability for CustomMethodRegistry {
    fn stage(&self, method: &str, params: Value) -> Result<CallOutcome, RpcError> {
        let Some(descriptor) = self.methods.get(method) else {
            // Transparent pass-through for standard operations.
            return self.base.stage(method, params);
        };

        let mut params = match descriptor.convert {
            Some(convert) => convert(params)?,
            None => params,
        };
        if descriptor.array_wrap {
            params = Value::Array(vec![params]);
        }
        Ok(CallOutcome::Deferred(DeferredRequest::new(
            descriptor.method,
            params,
        )))
    }

    fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method) || self.base.contains(method)
    }
}

impl std::fmt::Debug for CustomMethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&&str> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("CustomMethodRegistry")
            .field("methods", &names)
            .finish()
    }
}

/// The Helius-specific methods layered over the standard RPC surface.
pub fn helius_method_table() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::new("getAsset"),
        MethodDescriptor::new("getAssetBatch").with_converter(normalize_asset_batch),
        MethodDescriptor::new("getAssetProof"),
        MethodDescriptor::new("getAssetsByOwner"),
        MethodDescriptor::new("getAssetsByAuthority"),
        MethodDescriptor::new("getAssetsByCreator"),
        MethodDescriptor::new("getAssetsByGroup"),
        MethodDescriptor::new("searchAssets"),
        MethodDescriptor::new("getSignaturesForAsset"),
        MethodDescriptor::new("getTokenAccounts"),
        MethodDescriptor::new("getNftEditions"),
        // The fee endpoint expects its single options object wrapped in
        // a positional array.
        MethodDescriptor::array_wrapped("getPriorityFeeEstimate"),
    ]
}

/// Accept a bare list of asset ids for `getAssetBatch` and lift it into
/// the `{ "ids": [...] }` shape the endpoint expects.
fn normalize_asset_batch(params: Value) -> Result<Value, RpcError> {
    match params {
        Value::Array(ids) => Ok(serde_json::json!({ "ids": ids })),
        other => Ok(other),
    }
}

//! Client module for talking to Helius RPC.
//!
//! This module provides the dispatch stack, layered bottom-up:
//!
//! - [`Transport`] / [`HttpTransport`] — The wire seam: envelopes in,
//!   raw replies out
//! - [`RpcCapability`] / [`BaseRpc`] — Named operations staged as
//!   resolved values or deferred requests
//! - [`CustomMethodRegistry`] — Adds the Helius method table over a
//!   base capability
//! - [`DispatchProxy`] — Resolves staged calls, executing deferred
//!   requests and honoring per-method overrides
//! - [`Helius`] / [`HeliusBuilder`] — The assembled client, the single
//!   entry point
//!
//! [`ChainQueries`] is the typed read surface the stake client builds
//! on; [`DispatchProxy`] implements it.

mod capability;
mod helius;
mod proxy;
mod queries;
mod registry;
mod transport;

pub use capability::{BaseRpc, CallOutcome, DeferredRequest, RpcCapability};
pub use helius::{DEVNET_URL, Helius, HeliusBuilder, MAINNET_URL, Network};
pub use proxy::{DispatchProxy, DispatchProxyBuilder, OverrideFn};
pub use queries::ChainQueries;
pub use registry::{CustomMethodRegistry, MethodDescriptor, ParamConverter, helius_method_table};
pub use transport::{HttpTransport, RawResponse, RequestEnvelope, RpcErrorObject, Transport};

//! The main Helius client.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, RpcError};
use crate::stake::StakeClient;

use super::capability::BaseRpc;
use super::proxy::{DispatchProxy, OverrideFn};
use super::registry::CustomMethodRegistry;
use super::transport::HttpTransport;

/// Base URL for the mainnet RPC endpoint.
pub const MAINNET_URL: &str = "https://mainnet.helius-rpc.com";

/// Base URL for the devnet RPC endpoint.
pub const DEVNET_URL: &str = "https://devnet.helius-rpc.com";

/// The network a client is connected to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Devnet,
    Custom,
}

/// The main client for interacting with Helius RPC.
///
/// A `Helius` client wires an HTTP transport, the standard Solana
/// JSON-RPC surface, and the Helius-specific method table into one
/// dispatch path. Typed helpers cover the stake lifecycle; everything
/// else goes through [`invoke`](Self::invoke) by method name.
///
/// # Example
///
/// ```rust,no_run
/// use helius_kit::Helius;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), helius_kit::Error> {
///     let helius = Helius::mainnet().api_key("my-api-key").build();
///
///     // Standard RPC method
///     let slot = helius.invoke("getSlot", json!([])).await?;
///
///     // Helius-specific method
///     let asset = helius
///         .invoke("getAsset", json!({ "id": "F9Lw..." }))
///         .await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Helius {
    rpc: Arc<DispatchProxy>,
    url: String,
    network: Network,
}

impl Helius {
    /// Create a builder for mainnet.
    pub fn mainnet() -> HeliusBuilder {
        HeliusBuilder::new(MAINNET_URL, Network::Mainnet)
    }

    /// Create a builder for devnet.
    pub fn devnet() -> HeliusBuilder {
        HeliusBuilder::new(DEVNET_URL, Network::Devnet)
    }

    /// Create a builder with a custom RPC URL. The URL is used as
    /// given; no api key is appended.
    pub fn custom(url: impl Into<String>) -> HeliusBuilder {
        HeliusBuilder::new(url, Network::Custom)
    }

    /// Create a configured client from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `HELIUS_API_KEY` (required): the Helius api key.
    /// - `HELIUS_NETWORK` (optional): `"mainnet"`, `"devnet"`, or a
    ///   custom RPC URL. Defaults to `"mainnet"` if not set.
    pub fn from_env() -> Result<Helius, Error> {
        let api_key = std::env::var("HELIUS_API_KEY")
            .map_err(|_| Error::Config("HELIUS_API_KEY is not set".into()))?;
        let network = std::env::var("HELIUS_NETWORK").ok();

        let builder = match network.as_deref() {
            Some("mainnet") | None => Helius::mainnet(),
            Some("devnet") => Helius::devnet(),
            Some(url) => Helius::custom(url),
        };
        Ok(builder.api_key(api_key).build())
    }

    /// The underlying dispatch proxy.
    pub fn rpc(&self) -> &Arc<DispatchProxy> {
        &self.rpc
    }

    /// The endpoint URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The network this client is connected to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The stake lifecycle client.
    pub fn stake(&self) -> StakeClient {
        StakeClient::new(self.rpc.clone())
    }

    /// Invoke an RPC method by name.
    pub async fn invoke(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.rpc.invoke(method, params).await
    }

    /// Invoke an RPC method and deserialize its result.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        self.rpc.invoke_as(method, params).await
    }
}

impl std::fmt::Debug for Helius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helius")
            .field("network", &self.network)
            .finish()
    }
}

/// Builder for creating a [`Helius`] client.
///
/// # Example
///
/// ```rust,no_run
/// use helius_kit::Helius;
/// use serde_json::json;
///
/// let helius = Helius::devnet()
///     .api_key("my-api-key")
///     .override_method("getHealth", |_params| {
///         Box::pin(async { Ok(json!("ok")) })
///     })
///     .build();
/// ```
pub struct HeliusBuilder {
    url: String,
    network: Network,
    api_key: Option<String>,
    overrides: Vec<(String, OverrideFn)>,
}

impl HeliusBuilder {
    fn new(url: impl Into<String>, network: Network) -> Self {
        Self {
            url: url.into(),
            network,
            api_key: None,
            overrides: Vec::new(),
        }
    }

    /// Set the Helius api key. Appended to the URL as a query parameter
    /// for the mainnet and devnet presets; ignored for custom URLs,
    /// which are used as given.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Shadow `method` with a local handler. The handler permanently
    /// replaces wire dispatch for that name.
    pub fn override_method<F>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync + 'static,
    {
        self.overrides.push((method.into(), Arc::new(handler)));
        self
    }

    /// Build the client.
    pub fn build(self) -> Helius {
        let url = match (&self.network, &self.api_key) {
            (Network::Custom, _) | (_, None) => self.url,
            (_, Some(key)) => format!("{}/?api-key={key}", self.url),
        };

        let transport = Arc::new(HttpTransport::new(url.clone()));
        let registry = CustomMethodRegistry::with_helius_methods(Arc::new(BaseRpc));

        let mut proxy = DispatchProxy::builder(Arc::new(registry), transport);
        for (method, handler) in self.overrides {
            proxy = proxy.override_with(method, handler);
        }

        Helius {
            rpc: Arc::new(proxy.build()),
            url,
            network: self.network,
        }
    }
}

impl From<HeliusBuilder> for Helius {
    fn from(builder: HeliusBuilder) -> Self {
        builder.build()
    }
}

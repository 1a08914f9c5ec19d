use alloy::{
    network::{Ethereum, Network},
    providers::{DynProvider, Provider, RootProvider},
    transports::http::reqwest::Url,
};

use crate::node::NodeError;

/// Endpoints accepted by [`RobustNodeBuilder`](crate::node::RobustNodeBuilder): an already built
/// [`RootProvider`] (or an erased provider stack, whose root is used), or a connection string
/// (`http(s)://`, `ws(s)://` or an IPC path).
pub trait IntoRootProvider<N: Network = Ethereum> {
    /// Resolves `self` into a connected [`RootProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if a connection string cannot be connected.
    fn into_root_provider(self) -> impl Future<Output = Result<RootProvider<N>, NodeError>> + Send;
}

async fn connect<N: Network>(endpoint: &str) -> Result<RootProvider<N>, NodeError> {
    let provider = RootProvider::connect(endpoint).await.inspect_err(|err| {
        error!(endpoint = endpoint, error = %err, "Failed to connect endpoint");
    })?;
    debug!(endpoint = endpoint, "Connected endpoint");
    Ok(provider)
}

impl<N: Network> IntoRootProvider<N> for RootProvider<N> {
    async fn into_root_provider(self) -> Result<RootProvider<N>, NodeError> {
        Ok(self)
    }
}

impl<N: Network> IntoRootProvider<N> for DynProvider<N> {
    async fn into_root_provider(self) -> Result<RootProvider<N>, NodeError> {
        Ok(self.root().clone())
    }
}

impl<N: Network> IntoRootProvider<N> for &str {
    async fn into_root_provider(self) -> Result<RootProvider<N>, NodeError> {
        connect(self).await
    }
}

impl<N: Network> IntoRootProvider<N> for String {
    async fn into_root_provider(self) -> Result<RootProvider<N>, NodeError> {
        connect(&self).await
    }
}

impl<N: Network> IntoRootProvider<N> for Url {
    async fn into_root_provider(self) -> Result<RootProvider<N>, NodeError> {
        connect(self.as_str()).await
    }
}

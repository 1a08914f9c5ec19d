use std::time::Duration;

use alloy::{
    network::{Ethereum, Network},
    primitives::BlockNumber,
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
    transports::{RpcError, TransportErrorKind},
};
use backon::{ExponentialBuilder, Retryable};
use tokio::time::timeout;

use crate::node::{LogQuery, NodeClient, NodeError};

/// JSON-RPC [`NodeClient`] with per-call timeouts, retries and endpoint failover.
///
/// Every call is first attempted against the primary endpoint. Within one endpoint the call is
/// retried with exponential backoff, and the whole retry sequence is bounded by `call_timeout`.
/// When the primary gives up, each fallback endpoint gets the same treatment in turn, and the
/// error from the last endpoint tried is returned.
#[derive(Clone, Debug)]
pub struct RobustNode<N: Network = Ethereum> {
    pub(crate) primary: RootProvider<N>,
    pub(crate) fallbacks: Vec<RootProvider<N>>,
    pub(crate) call_timeout: Duration,
    pub(crate) max_retries: usize,
    pub(crate) min_delay: Duration,
}

impl<N: Network> RobustNode<N> {
    /// The primary endpoint.
    #[must_use]
    pub fn primary(&self) -> &RootProvider<N> {
        &self.primary
    }

    /// Number of configured fallback endpoints.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.len()
    }

    /// Runs `operation` against the primary endpoint, then against each fallback until one
    /// succeeds.
    async fn call_with_failover<T, F, Fut>(
        &self,
        method: &'static str,
        operation: F,
    ) -> Result<T, NodeError>
    where
        F: Fn(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let mut last_error = match self.call_endpoint(&self.primary, &operation).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let total = self.fallbacks.len();
        for (idx, endpoint) in self.fallbacks.iter().enumerate() {
            warn!(
                method = method,
                fallback = idx + 1,
                fallback_count = total,
                error = %last_error,
                "Previous endpoint failed, trying fallback"
            );
            match self.call_endpoint(endpoint, &operation).await {
                Ok(value) => return Ok(value),
                Err(err) => last_error = err,
            }
        }

        error!(method = method, error = %last_error, "All endpoints failed");
        Err(last_error)
    }

    /// Runs `operation` against a single endpoint, retrying inside the call timeout.
    async fn call_endpoint<T, F, Fut>(
        &self,
        endpoint: &RootProvider<N>,
        operation: F,
    ) -> Result<T, NodeError>
    where
        F: Fn(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let backoff = ExponentialBuilder::default()
            .with_max_times(self.max_retries)
            .with_min_delay(self.min_delay);

        let attempts = (|| operation(endpoint.clone()))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .notify(|err: &RpcError<TransportErrorKind>, delay: Duration| {
                debug!(error = %err, delay_ms = delay.as_millis(), "Retrying RPC call");
            });

        Ok(timeout(self.call_timeout, attempts).await??)
    }
}

impl<N: Network> NodeClient for RobustNode<N> {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<Log>, NodeError> {
        let filter = Filter::from(query);
        trace!(from_block = query.from_block, to_block = query.to_block, "eth_getLogs");
        self.call_with_failover("eth_getLogs", move |endpoint| {
            let filter = filter.clone();
            async move { endpoint.get_logs(&filter).await }
        })
        .await
    }

    async fn get_block_number(&self) -> Result<BlockNumber, NodeError> {
        trace!("eth_blockNumber");
        self.call_with_failover("eth_blockNumber", |endpoint| async move {
            endpoint.get_block_number().await
        })
        .await
    }
}

use std::{pin::Pin, time::Duration};

use alloy::{network::Network, providers::RootProvider};

use crate::node::{IntoRootProvider, NodeError, RobustNode};

type PendingEndpoint<N> = Pin<Box<dyn Future<Output = Result<RootProvider<N>, NodeError>> + Send>>;

/// Default total timeout of a single node call, retries included.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of retries per endpoint.
pub const DEFAULT_MAX_RETRIES: usize = 3;
/// Default initial backoff delay.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);

/// Builder for [`RobustNode`].
pub struct RobustNodeBuilder<N: Network, P: IntoRootProvider<N>> {
    primary: P,
    fallbacks: Vec<PendingEndpoint<N>>,
    call_timeout: Duration,
    max_retries: usize,
    min_delay: Duration,
}

impl<N: Network, P: IntoRootProvider<N>> RobustNodeBuilder<N, P> {
    /// Starts a builder with `primary` as the main endpoint and default retry settings.
    #[must_use]
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: DEFAULT_MIN_DELAY,
        }
    }

    /// Starts a builder that never retries; only the call timeout and failover apply.
    #[must_use]
    pub fn fragile(primary: P) -> Self {
        Self::new(primary).max_retries(0).min_delay(Duration::ZERO)
    }

    /// Adds a fallback endpoint. Fallbacks are tried in insertion order.
    #[must_use]
    pub fn fallback<F: IntoRootProvider<N> + Send + 'static>(mut self, endpoint: F) -> Self {
        self.fallbacks.push(Box::pin(endpoint.into_root_provider()));
        self
    }

    /// Sets the total timeout of a single call on one endpoint, retries included.
    #[must_use]
    pub fn call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Sets how many times a failed call is retried on the same endpoint.
    #[must_use]
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial delay of the exponential backoff.
    #[must_use]
    pub fn min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// Connects every endpoint and returns the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary or any fallback endpoint cannot be connected.
    pub async fn build(self) -> Result<RobustNode<N>, NodeError> {
        debug!(
            call_timeout_ms = self.call_timeout.as_millis(),
            max_retries = self.max_retries,
            fallback_count = self.fallbacks.len(),
            "Building RobustNode"
        );

        let primary = self.primary.into_root_provider().await?;

        let mut fallbacks = Vec::with_capacity(self.fallbacks.len());
        for pending in self.fallbacks {
            fallbacks.push(pending.await?);
        }

        Ok(RobustNode {
            primary,
            fallbacks,
            call_timeout: self.call_timeout,
            max_retries: self.max_retries,
            min_delay: self.min_delay,
        })
    }
}

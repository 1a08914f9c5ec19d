//! The node-query capability the scanner runs against.
//!
//! [`RangeScanner`](crate::RangeScanner) only needs two calls from a node: fetch the logs of one
//! event over a block range, and read the current block number. [`NodeClient`] captures exactly
//! that, so the scanner can be driven by a live JSON-RPC endpoint ([`RobustNode`]) or by an
//! in-memory fixture in tests.
//!
//! # Robust JSON-RPC client
//!
//! [`RobustNode`] wraps one or more Alloy [`RootProvider`](alloy::providers::RootProvider)s and
//! adds:
//! * a total timeout per call
//! * exponential backoff retries
//! * failover to fallback endpoints, in the order they were added
//!
//! ```rust,no_run
//! use address_scanner::node::{NodeClient, RobustNode, RobustNodeBuilder};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let node: RobustNode = RobustNodeBuilder::new("https://eth.example.org")
//!     .fallback("https://eth-backup.example.org")
//!     .call_timeout(Duration::from_secs(20))
//!     .max_retries(2)
//!     .build()
//!     .await?;
//!
//! let head = node.get_block_number().await?;
//! println!("chain head: {head}");
//! # Ok(()) }
//! ```

mod builder;
mod conversion;
mod robust;

use std::{ops::RangeInclusive, sync::Arc};

use alloy::{
    primitives::{B256, BlockNumber},
    rpc::types::{Filter, Log},
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

pub use builder::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_MIN_DELAY, RobustNodeBuilder,
};
pub use conversion::IntoRootProvider;
pub use robust::RobustNode;

/// Errors reported by a [`NodeClient`].
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    /// The call did not complete within the configured timeout.
    #[error("operation timed out")]
    Timeout,

    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),
}

impl From<RpcError<TransportErrorKind>> for NodeError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        NodeError::RpcError(Arc::new(err))
    }
}

impl From<tokio::time::error::Elapsed> for NodeError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        NodeError::Timeout
    }
}

/// A log query for a single event type over an inclusive block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub from_block: BlockNumber,
    pub to_block: BlockNumber,
    /// Topic hash the first log topic must equal.
    pub event_selector: B256,
}

impl LogQuery {
    #[must_use]
    pub fn new(range: RangeInclusive<BlockNumber>, event_selector: B256) -> Self {
        Self { from_block: *range.start(), to_block: *range.end(), event_selector }
    }

    /// The queried block range.
    #[must_use]
    pub fn range(&self) -> RangeInclusive<BlockNumber> {
        self.from_block..=self.to_block
    }

    /// Number of blocks covered by the query.
    #[must_use]
    pub fn block_span(&self) -> u64 {
        self.to_block.saturating_sub(self.from_block).saturating_add(1)
    }
}

impl From<&LogQuery> for Filter {
    fn from(query: &LogQuery) -> Self {
        Filter::new()
            .from_block(query.from_block)
            .to_block(query.to_block)
            .event_signature(query.event_selector)
    }
}

/// Node-query capability required by the scanner.
///
/// Both calls may fail with a [`NodeError`]; the scanner never retries them.
pub trait NodeClient {
    /// Returns the logs matching `query`.
    fn get_logs(
        &self,
        query: &LogQuery,
    ) -> impl Future<Output = Result<Vec<Log>, NodeError>> + Send;

    /// Returns the number of the most recent block known to the node.
    fn get_block_number(&self) -> impl Future<Output = Result<BlockNumber, NodeError>> + Send;
}

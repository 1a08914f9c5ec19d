use std::{mem::discriminant, ops::RangeInclusive};

use alloy::primitives::BlockNumber;
use thiserror::Error;

use crate::{node::NodeError, types::BlockScanResult};

/// Errors returned by [`RangeScanner`](crate::RangeScanner) and yielded by
/// [`AddressStream`](crate::AddressStream).
///
/// Decode mismatches never surface here: a log that does not fit a signature is skipped inside
/// the scan. Every variant below is terminal for the operation that produced it.
#[derive(Error, Debug, Clone)]
pub enum ScannerError {
    /// A log query failed for one event signature over one block range.
    ///
    /// Groups already accumulated for that range are discarded.
    #[error("log query for {signature} over blocks {from_block}..={to_block} failed: {source}")]
    QueryFailure {
        signature: String,
        from_block: BlockNumber,
        to_block: BlockNumber,
        #[source]
        source: NodeError,
    },

    /// The chain head could not be read when starting a stream.
    #[error("failed to read the chain head: {0}")]
    HeadQueryFailure(#[source] NodeError),

    /// `from_block` was above `to_block`.
    #[error("invalid block range: from block {from_block} is above to block {to_block}")]
    InvalidRange { from_block: BlockNumber, to_block: BlockNumber },

    /// The scanner was configured without any event signature to look for.
    #[error("at least one event signature is required")]
    NoEventSignatures,
}

impl ScannerError {
    /// Returns the block range of a failed log query, if this is a [`ScannerError::QueryFailure`].
    #[must_use]
    pub fn failed_range(&self) -> Option<RangeInclusive<BlockNumber>> {
        match self {
            ScannerError::QueryFailure { from_block, to_block, .. } => {
                Some(*from_block..=*to_block)
            }
            _ => None,
        }
    }
}

impl PartialEq<ScannerError> for BlockScanResult {
    fn eq(&self, other: &ScannerError) -> bool {
        match self {
            Ok(_) => false,
            Err(err) => discriminant(err) == discriminant(other),
        }
    }
}

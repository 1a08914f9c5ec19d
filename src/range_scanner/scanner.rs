//! Block-range address scanner.
//!
//! [`RangeScanner`] answers one question for a span of blocks: which contracts emitted at least one
//! log that decodes as one of the configured event signatures, block by block.
//!
//! # Output
//!
//! [`RangeScanner::fetch`] returns one [`BlockAddressGroup`] per block of the requested range, in
//! increasing block order, including blocks where nothing matched.
//!
//! [`RangeScanner::stream`] walks from a starting block up to the chain head read when the stream
//! is created, fetching sub-ranges of at most `step + 1` blocks on demand.
//!
//! # Example usage:
//!
//! ```rust,no_run
//! use address_scanner::{
//!     EventSignatureSet, RangeScannerBuilder,
//!     node::{RobustNode, RobustNodeBuilder},
//! };
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tracing_subscriber::fmt::init();
//!
//!     let node: RobustNode = RobustNodeBuilder::new("https://eth.example.org").build().await?;
//!     let scanner = RangeScannerBuilder::new()
//!         .signatures(EventSignatureSet::erc721())
//!         .connect(node)?;
//!
//!     let mut stream = Box::pin(scanner.stream(19_000_000).await?.into_stream());
//!     while let Some(group) = stream.next().await {
//!         let group = group?;
//!         if !group.is_empty() {
//!             println!("{group}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::{Address, BlockNumber};

use crate::{
    ScannerError,
    decoder::{self, EventSignature},
    node::{LogQuery, NodeClient},
    range_scanner::stream::AddressStream,
    signatures::EventSignatureSet,
    types::BlockAddressGroup,
};

/// A [`RangeScanner`] bound to a node client.
#[derive(Debug)]
pub struct RangeScanner<C> {
    pub(crate) node: C,
    pub(crate) signatures: EventSignatureSet,
    pub(crate) step: u64,
}

impl<C: NodeClient> RangeScanner<C> {
    /// Returns the underlying node client.
    #[must_use]
    pub fn node(&self) -> &C {
        &self.node
    }

    /// Returns the event signatures scanned for.
    #[must_use]
    pub fn signatures(&self) -> &EventSignatureSet {
        &self.signatures
    }

    /// Returns the configured step.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Collects, per block of `from_block..=to_block`, the addresses that emitted a matching event.
    ///
    /// One log query is issued per event signature, covering the whole range; callers are
    /// responsible for keeping the range within what their node accepts (see [`Self::stream`]).
    /// Logs that do not decode under the signature they were queried for are skipped.
    ///
    /// # Errors
    ///
    /// * [`ScannerError::InvalidRange`] - if `from_block > to_block`.
    /// * [`ScannerError::QueryFailure`] - if any log query fails. Nothing is returned for the
    ///   range in that case.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn fetch(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<BlockAddressGroup>, ScannerError> {
        if from_block > to_block {
            return Err(ScannerError::InvalidRange { from_block, to_block });
        }

        let mut found: BTreeMap<BlockNumber, BTreeSet<Address>> = BTreeMap::new();
        for signature in &self.signatures {
            self.collect_emitters(signature, from_block, to_block, &mut found).await?;
        }

        let groups: Vec<_> = (from_block..=to_block)
            .map(|block_number| BlockAddressGroup {
                block_number,
                addresses: found.remove(&block_number).unwrap_or_default(),
            })
            .collect();

        debug!(
            from_block = from_block,
            to_block = to_block,
            blocks_with_matches = groups.iter().filter(|group| !group.is_empty()).count(),
            "Fetched block range"
        );

        Ok(groups)
    }

    /// Queries the logs of one signature and records the address of every log that decodes.
    async fn collect_emitters(
        &self,
        signature: &EventSignature,
        from_block: BlockNumber,
        to_block: BlockNumber,
        found: &mut BTreeMap<BlockNumber, BTreeSet<Address>>,
    ) -> Result<(), ScannerError> {
        let query = LogQuery::new(from_block..=to_block, signature.selector());

        let logs = match self.node.get_logs(&query).await {
            Ok(logs) => logs,
            Err(source) => {
                error!(
                    signature = %signature,
                    from_block = from_block,
                    to_block = to_block,
                    error = %source,
                    "Log query failed"
                );
                return Err(ScannerError::QueryFailure {
                    signature: signature.signature().to_owned(),
                    from_block,
                    to_block,
                    source,
                });
            }
        };

        debug!(signature = %signature, log_count = logs.len(), "Received logs");

        for log in &logs {
            let Some(block_number) = log.block_number else {
                warn!(address = %log.address(), "Skipping log without block number");
                continue;
            };
            if !query.range().contains(&block_number) {
                warn!(
                    block_number = block_number,
                    from_block = from_block,
                    to_block = to_block,
                    "Skipping log outside the queried range"
                );
                continue;
            }

            match decoder::decode(signature, log) {
                Ok(_) => {
                    found.entry(block_number).or_default().insert(log.address());
                }
                Err(mismatch) => {
                    trace!(
                        signature = %signature,
                        address = %log.address(),
                        block_number = block_number,
                        reason = %mismatch,
                        "Log does not match signature"
                    );
                }
            }
        }

        Ok(())
    }

    /// Streams address groups from `from_block` up to the current chain head.
    ///
    /// The chain head is read once, here. The returned stream fetches sub-ranges of at most
    /// `step + 1` blocks, each only when the consumer asks for a group beyond the previous one,
    /// and ends after the group of the recorded head. A block mined later is not picked up by this
    /// stream; start a new one to continue from where it stopped.
    ///
    /// # Errors
    ///
    /// * [`ScannerError::HeadQueryFailure`] - if the chain head cannot be read.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn stream(
        &self,
        from_block: BlockNumber,
    ) -> Result<AddressStream<'_, C>, ScannerError> {
        let chain_head = self.node.get_block_number().await.map_err(|err| {
            error!(error = %err, "Failed to read chain head");
            ScannerError::HeadQueryFailure(err)
        })?;

        info!(
            from_block = from_block,
            chain_head = chain_head,
            step = self.step,
            "Starting address stream"
        );

        Ok(AddressStream::new(self, from_block, chain_head))
    }
}

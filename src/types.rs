use std::{collections::BTreeSet, fmt};

use alloy::primitives::{Address, BlockNumber};
use serde::Serialize;

use crate::ScannerError;

/// The contracts that emitted at least one matching event in one block.
///
/// Addresses are kept in a set: a contract emitting several matching logs in the same block, under
/// one or several signatures, appears once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockAddressGroup {
    pub block_number: BlockNumber,
    pub addresses: BTreeSet<Address>,
}

impl BlockAddressGroup {
    /// A group with no address.
    #[must_use]
    pub fn empty(block_number: BlockNumber) -> Self {
        Self { block_number, addresses: BTreeSet::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }
}

impl<I: IntoIterator<Item = Address>> From<(BlockNumber, I)> for BlockAddressGroup {
    fn from((block_number, addresses): (BlockNumber, I)) -> Self {
        Self { block_number, addresses: addresses.into_iter().collect() }
    }
}

/// Prints `block #<n>` followed by one checksummed address per line.
impl fmt::Display for BlockAddressGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block #{}", self.block_number)?;
        for address in &self.addresses {
            write!(f, "\n{address}")?;
        }
        Ok(())
    }
}

pub type BlockScanResult = Result<BlockAddressGroup, ScannerError>;

impl PartialEq<BlockAddressGroup> for BlockScanResult {
    fn eq(&self, other: &BlockAddressGroup) -> bool {
        matches!(self, Ok(group) if group == other)
    }
}

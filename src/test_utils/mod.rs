//! Fixtures for exercising the scanner without a live node.
//!
//! Available under `cfg(test)` and with the `test-utils` feature.

pub mod macros;
mod mock;

use alloy::{
    primitives::{self, Address, B256, BlockNumber, Bytes, LogData, U256, keccak256},
    rpc::types::Log,
};

pub use mock::MockNode;

/// Builds RPC [`Log`]s with just the fields the scanner reads.
#[derive(Debug, Clone)]
pub struct LogBuilder {
    block_number: BlockNumber,
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl LogBuilder {
    #[must_use]
    pub fn new(block_number: BlockNumber, address: Address) -> Self {
        Self { block_number, address, topics: Vec::new(), data: Bytes::new() }
    }

    /// Appends a topic.
    #[must_use]
    pub fn topic(mut self, topic: B256) -> Self {
        self.topics.push(topic);
        self
    }

    /// Replaces the non-indexed data.
    #[must_use]
    pub fn data(mut self, data: impl AsRef<[u8]>) -> Self {
        self.data = Bytes::copy_from_slice(data.as_ref());
        self
    }

    #[must_use]
    pub fn build(self) -> Log {
        Log {
            inner: primitives::Log {
                address: self.address,
                data: LogData::new_unchecked(self.topics, self.data),
            },
            block_number: Some(self.block_number),
            removed: false,
            ..Default::default()
        }
    }
}

fn selector(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// An ERC-721 `Transfer(from, to, tokenId)` log, all three parameters indexed.
#[must_use]
pub fn erc721_transfer_log(block_number: BlockNumber, address: Address) -> Log {
    LogBuilder::new(block_number, address)
        .topic(selector("Transfer(address,address,uint256)"))
        .topic(Address::repeat_byte(0x01).into_word())
        .topic(Address::repeat_byte(0x02).into_word())
        .topic(B256::from(U256::from(block_number)))
        .build()
}

/// An ERC-721 `Approval(owner, approved, tokenId)` log.
#[must_use]
pub fn erc721_approval_log(block_number: BlockNumber, address: Address) -> Log {
    LogBuilder::new(block_number, address)
        .topic(selector("Approval(address,address,uint256)"))
        .topic(Address::repeat_byte(0x03).into_word())
        .topic(Address::repeat_byte(0x04).into_word())
        .topic(B256::from(U256::from(1)))
        .build()
}

/// An ERC-721 `ApprovalForAll(owner, operator, approved)` log.
#[must_use]
pub fn erc721_approval_for_all_log(block_number: BlockNumber, address: Address) -> Log {
    LogBuilder::new(block_number, address)
        .topic(selector("ApprovalForAll(address,address,bool)"))
        .topic(Address::repeat_byte(0x05).into_word())
        .topic(Address::repeat_byte(0x06).into_word())
        .data(U256::from(1).to_be_bytes::<32>())
        .build()
}

/// An ERC-20 `Transfer(from, to, value)` log: same selector as the ERC-721 event, but the amount
/// travels in the data instead of a fourth topic.
#[must_use]
pub fn erc20_transfer_log(block_number: BlockNumber, address: Address) -> Log {
    LogBuilder::new(block_number, address)
        .topic(selector("Transfer(address,address,uint256)"))
        .topic(Address::repeat_byte(0x01).into_word())
        .topic(Address::repeat_byte(0x02).into_word())
        .data(U256::from(1_000).to_be_bytes::<32>())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_block_and_topics() {
        let log = LogBuilder::new(7, Address::repeat_byte(0x42))
            .topic(B256::repeat_byte(0x01))
            .data([0xff; 4])
            .build();

        assert_eq!(log.block_number, Some(7));
        assert_eq!(log.address(), Address::repeat_byte(0x42));
        assert_eq!(log.topics(), &[B256::repeat_byte(0x01)]);
        assert_eq!(log.data().data.as_ref(), &[0xff; 4]);
        assert!(!log.removed);
    }

    #[test]
    fn erc20_and_erc721_transfers_share_a_selector() {
        let erc20 = erc20_transfer_log(1, Address::ZERO);
        let erc721 = erc721_transfer_log(1, Address::ZERO);

        assert_eq!(erc20.topics()[0], erc721.topics()[0]);
        assert_eq!(erc20.topics().len(), 3);
        assert_eq!(erc721.topics().len(), 4);
    }
}

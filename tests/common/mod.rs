#![allow(dead_code)]

use address_scanner::{
    EventSignature, EventSignatureSet, RangeScanner, RangeScannerBuilder, test_utils::MockNode,
};
use alloy::primitives::{Address, address};

pub const CONTRACT_A: Address = address!("0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a");
pub const CONTRACT_B: Address = address!("0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b");
pub const CONTRACT_C: Address = address!("0x0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c");

pub struct ScannerSetup {
    pub node: MockNode,
    pub scanner: RangeScanner<MockNode>,
}

/// A scanner over the bundled ERC-721 signatures, backed by a [`MockNode`] at `chain_head`.
///
/// `node` shares its fixture with the scanner's own client, so logs can be pushed after setup.
pub fn setup_scanner(chain_head: u64, step: u64) -> anyhow::Result<ScannerSetup> {
    setup_scanner_with(MockNode::new(chain_head), EventSignatureSet::erc721(), step)
}

pub fn setup_scanner_with(
    node: MockNode,
    signatures: EventSignatureSet,
    step: u64,
) -> anyhow::Result<ScannerSetup> {
    let scanner =
        RangeScannerBuilder::new().step(step).signatures(signatures).connect(node.clone())?;
    Ok(ScannerSetup { node, scanner })
}

/// The bundled signature called `name`, as a single-signature set.
pub fn only(name: &str) -> anyhow::Result<EventSignatureSet> {
    let signature: EventSignature = EventSignatureSet::erc721()
        .by_name(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no bundled event named {name}"))?;
    Ok(EventSignatureSet::new(vec![signature])?)
}

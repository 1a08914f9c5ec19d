mod common;

use std::io::Write;

use address_scanner::{
    BlockAddressGroup, EventSignatureSet, SignatureError,
    test_utils::{LogBuilder, MockNode},
};
use alloy::primitives::{Address, U256};

use crate::common::{CONTRACT_A, CONTRACT_B, CONTRACT_C, setup_scanner_with};

const ERC1155_ARTIFACT: &str = r#"{
    "contractName": "MultiToken",
    "abi": [
        {
            "type": "event",
            "name": "TransferSingle",
            "anonymous": false,
            "inputs": [
                { "name": "operator", "type": "address", "indexed": true },
                { "name": "from", "type": "address", "indexed": true },
                { "name": "to", "type": "address", "indexed": true },
                { "name": "id", "type": "uint256", "indexed": false },
                { "name": "value", "type": "uint256", "indexed": false }
            ]
        },
        {
            "type": "event",
            "name": "Debug",
            "anonymous": true,
            "inputs": [{ "name": "data", "type": "bytes", "indexed": false }]
        }
    ],
    "bytecode": "0x"
}"#;

fn transfer_single(block: u64, address: Address, data: Vec<u8>) -> alloy::rpc::types::Log {
    let signatures = EventSignatureSet::from_json_str(ERC1155_ARTIFACT).expect("valid ABI");
    let selector = signatures.by_name("TransferSingle").expect("event present").selector();
    LogBuilder::new(block, address)
        .topic(selector)
        .topic(Address::repeat_byte(0x01).into_word())
        .topic(Address::ZERO.into_word())
        .topic(Address::repeat_byte(0x02).into_word())
        .data(data)
        .build()
}

fn words(values: &[u64]) -> Vec<u8> {
    values.iter().flat_map(|value| U256::from(*value).to_be_bytes::<32>()).collect()
}

#[tokio::test]
async fn scans_events_with_non_indexed_parameters_from_an_abi_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(ERC1155_ARTIFACT.as_bytes())?;

    let signatures = EventSignatureSet::from_path(file.path())?;
    assert_eq!(signatures.len(), 1);

    let setup = setup_scanner_with(MockNode::new(50), signatures, 9)?;
    setup.node.push_log(transfer_single(10, CONTRACT_A, words(&[7, 1])));
    setup.node.push_log(transfer_single(10, CONTRACT_B, words(&[8, 3])));
    // `value` is missing
    setup.node.push_log(transfer_single(10, CONTRACT_C, words(&[7])));

    let groups = setup.scanner.fetch(10, 10).await?;

    assert_eq!(groups, vec![BlockAddressGroup::from((10, [CONTRACT_A, CONTRACT_B]))]);
    Ok(())
}

#[test]
fn abi_with_only_anonymous_events_is_rejected() {
    let abi = r#"[{
        "type": "event",
        "name": "Debug",
        "anonymous": true,
        "inputs": [{ "name": "data", "type": "bytes", "indexed": false }]
    }]"#;

    assert!(matches!(EventSignatureSet::from_json_str(abi), Err(SignatureError::NoEvents)));
}

//! Structural decoding of raw logs against known event signatures.
//!
//! A scanner checks every log against every signature of an interface, so a mismatch is the
//! common case rather than a failure. [`decode`] therefore reports it as a plain
//! [`DecodeMismatch`] value that callers skip over.

use std::fmt;

use alloy::{
    dyn_abi::{DecodedEvent, DynSolType, DynSolValue, Specifier},
    json_abi::Event,
    primitives::B256,
    rpc::types::Log,
};
use thiserror::Error;

use crate::signatures::SignatureError;

/// One recognized event shape, resolved from its ABI definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
    name: String,
    signature: String,
    selector: B256,
    indexed: Vec<DynSolType>,
    body: Vec<DynSolType>,
}

impl EventSignature {
    /// Event name, e.g. `Transfer`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Keccak-256 of the canonical signature; the first topic of every matching log.
    #[must_use]
    pub fn selector(&self) -> B256 {
        self.selector
    }

    /// Types of the indexed parameters, in declaration order.
    #[must_use]
    pub fn indexed_types(&self) -> &[DynSolType] {
        &self.indexed
    }

    /// Types of the non-indexed parameters, in declaration order.
    #[must_use]
    pub fn body_types(&self) -> &[DynSolType] {
        &self.body
    }

    /// Number of topics a matching log carries: the selector plus one per indexed parameter.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.indexed.len() + 1
    }
}

impl TryFrom<&Event> for EventSignature {
    type Error = SignatureError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        if event.anonymous {
            return Err(SignatureError::Anonymous(event.name.clone()));
        }

        let mut indexed = Vec::new();
        let mut body = Vec::new();
        for param in &event.inputs {
            let ty = param.resolve().map_err(|source| SignatureError::UnsupportedType {
                event: event.name.clone(),
                param: param.name.clone(),
                source,
            })?;
            if param.indexed {
                indexed.push(ty);
            } else {
                body.push(ty);
            }
        }

        Ok(Self {
            name: event.name.clone(),
            signature: event.signature(),
            selector: event.selector(),
            indexed,
            body,
        })
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

/// Why a log does not fit an event signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeMismatch {
    #[error("log has no topics")]
    MissingSelector,

    #[error("first topic {found} is not the event selector {expected}")]
    SelectorMismatch { expected: B256, found: B256 },

    #[error("expected {expected} topics, log has {found}")]
    TopicCountMismatch { expected: usize, found: usize },

    #[error("topic {index} does not decode as its indexed parameter: {reason}")]
    TopicMismatch { index: usize, reason: String },

    #[error("log data does not decode as the event's non-indexed parameters: {0}")]
    DataMismatch(String),
}

/// Attempts to interpret `log` as an instance of `signature`.
///
/// The log matches when its first topic is the selector, it carries exactly one topic per indexed
/// parameter after that, and its data decodes as the ABI tuple of the non-indexed parameters.
/// Trailing bytes after the encoded parameters are tolerated.
///
/// # Errors
///
/// Returns a [`DecodeMismatch`] describing the first structural difference found.
pub fn decode(signature: &EventSignature, log: &Log) -> Result<DecodedEvent, DecodeMismatch> {
    let topics = log.topics();

    let Some(&first) = topics.first() else {
        return Err(DecodeMismatch::MissingSelector);
    };
    if first != signature.selector {
        return Err(DecodeMismatch::SelectorMismatch { expected: signature.selector, found: first });
    }
    if topics.len() != signature.topic_count() {
        return Err(DecodeMismatch::TopicCountMismatch {
            expected: signature.topic_count(),
            found: topics.len(),
        });
    }

    let indexed = signature
        .indexed
        .iter()
        .zip(&topics[1..])
        .enumerate()
        .map(|(index, (ty, topic))| decode_topic(ty, *topic, index + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let body = if signature.body.is_empty() {
        Vec::new()
    } else {
        let tuple = DynSolType::Tuple(signature.body.clone());
        let decoded = tuple
            .abi_decode_sequence(&log.data().data)
            .map_err(|err| DecodeMismatch::DataMismatch(err.to_string()))?;
        decoded.as_fixed_seq().map(<[_]>::to_vec).unwrap_or_default()
    };

    Ok(DecodedEvent { selector: Some(first), indexed, body })
}

/// Decodes one indexed parameter. Value types occupy the topic word directly; any other type is
/// only present as the keccak-256 of its encoding and is kept as that word.
fn decode_topic(
    ty: &DynSolType,
    topic: B256,
    index: usize,
) -> Result<DynSolValue, DecodeMismatch> {
    match ty {
        DynSolType::Address
        | DynSolType::Bool
        | DynSolType::Int(_)
        | DynSolType::Uint(_)
        | DynSolType::FixedBytes(_) => ty
            .abi_decode(topic.as_slice())
            .map_err(|err| DecodeMismatch::TopicMismatch { index, reason: err.to_string() }),
        _ => Ok(DynSolValue::FixedBytes(topic, 32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{signatures::EventSignatureSet, test_utils::LogBuilder};
    use alloy::primitives::{Address, U256, keccak256};

    fn erc721_transfer() -> EventSignature {
        EventSignatureSet::erc721().by_name("Transfer").cloned().expect("bundled event")
    }

    fn erc721_approval_for_all() -> EventSignature {
        EventSignatureSet::erc721().by_name("ApprovalForAll").cloned().expect("bundled event")
    }

    #[test]
    fn resolves_signature_metadata() {
        let transfer = erc721_transfer();

        assert_eq!(transfer.name(), "Transfer");
        assert_eq!(transfer.signature(), "Transfer(address,address,uint256)");
        assert_eq!(transfer.topic_count(), 4);
        assert!(transfer.body_types().is_empty());
        assert_eq!(transfer.indexed_types()[2], DynSolType::Uint(256));
    }

    #[test]
    fn decodes_erc721_transfer() {
        let transfer = erc721_transfer();
        let from = Address::repeat_byte(0x01);
        let to = Address::repeat_byte(0x02);
        let log = LogBuilder::new(100, Address::repeat_byte(0xaa))
            .topic(transfer.selector())
            .topic(from.into_word())
            .topic(to.into_word())
            .topic(B256::from(U256::from(7)))
            .build();

        let decoded = decode(&transfer, &log).expect("log should decode");

        assert_eq!(decoded.selector, Some(transfer.selector()));
        assert_eq!(decoded.indexed[0], DynSolValue::Address(from));
        assert_eq!(decoded.indexed[1], DynSolValue::Address(to));
        assert_eq!(decoded.indexed[2], DynSolValue::Uint(U256::from(7), 256));
        assert!(decoded.body.is_empty());
    }

    #[test]
    fn keeps_hash_of_dynamic_indexed_parameter() -> anyhow::Result<()> {
        let abi = r#"[{
            "type": "event",
            "name": "Registered",
            "anonymous": false,
            "inputs": [
                { "name": "name", "type": "string", "indexed": true },
                { "name": "owner", "type": "address", "indexed": true }
            ]
        }]"#;
        let set = EventSignatureSet::from_json_str(abi)?;
        let registered = set.by_name("Registered").expect("event present");
        let name_hash = keccak256("alice");
        let log = LogBuilder::new(3, Address::repeat_byte(0xdd))
            .topic(registered.selector())
            .topic(name_hash)
            .topic(Address::repeat_byte(0x03).into_word())
            .build();

        let decoded = decode(registered, &log)?;

        assert_eq!(decoded.indexed[0], DynSolValue::FixedBytes(name_hash, 32));
        assert_eq!(decoded.indexed[1], DynSolValue::Address(Address::repeat_byte(0x03)));
        Ok(())
    }

    #[test]
    fn rejects_erc20_transfer_with_missing_indexed_topic() {
        let transfer = erc721_transfer();
        // ERC-20 Transfer shares the selector but keeps the amount in the data field
        let log = LogBuilder::new(100, Address::repeat_byte(0xbb))
            .topic(transfer.selector())
            .topic(Address::repeat_byte(0x01).into_word())
            .topic(Address::repeat_byte(0x02).into_word())
            .data(U256::from(1_000).to_be_bytes::<32>())
            .build();

        assert_eq!(
            decode(&transfer, &log).unwrap_err(),
            DecodeMismatch::TopicCountMismatch { expected: 4, found: 3 }
        );
    }

    #[test]
    fn rejects_foreign_selector() {
        let transfer = erc721_transfer();
        let other = B256::repeat_byte(0x42);
        let log = LogBuilder::new(1, Address::ZERO).topic(other).build();

        assert_eq!(
            decode(&transfer, &log).unwrap_err(),
            DecodeMismatch::SelectorMismatch { expected: transfer.selector(), found: other }
        );
    }

    #[test]
    fn rejects_log_without_topics() {
        let log = LogBuilder::new(1, Address::ZERO).build();

        assert_eq!(decode(&erc721_transfer(), &log).unwrap_err(), DecodeMismatch::MissingSelector);
    }

    #[test]
    fn decodes_non_indexed_parameters_from_data() {
        let approval_for_all = erc721_approval_for_all();
        let log = LogBuilder::new(5, Address::repeat_byte(0xcc))
            .topic(approval_for_all.selector())
            .topic(Address::repeat_byte(0x01).into_word())
            .topic(Address::repeat_byte(0x02).into_word())
            .data(U256::from(1).to_be_bytes::<32>())
            .build();

        let decoded = decode(&approval_for_all, &log).expect("log should decode");

        assert_eq!(decoded.body, vec![DynSolValue::Bool(true)]);
    }

    #[test]
    fn rejects_truncated_data() {
        let approval_for_all = erc721_approval_for_all();
        let log = LogBuilder::new(5, Address::repeat_byte(0xcc))
            .topic(approval_for_all.selector())
            .topic(Address::repeat_byte(0x01).into_word())
            .topic(Address::repeat_byte(0x02).into_word())
            .data([0x01; 12])
            .build();

        assert!(matches!(decode(&approval_for_all, &log), Err(DecodeMismatch::DataMismatch(_))));
    }
}

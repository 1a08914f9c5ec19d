//! Loading the set of event signatures to scan for from a JSON ABI.

use std::{fs, path::Path, slice};

use alloy::{json_abi::JsonAbi, primitives::B256};
use serde_json::Value;
use thiserror::Error;

use crate::decoder::EventSignature;

/// ABI of the ERC-721 events, bundled with the crate.
pub const ERC721_ABI: &str = include_str!("../abi/erc721.json");

/// Errors raised while turning an ABI document into an [`EventSignatureSet`].
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("failed to read ABI file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event {0} is anonymous and cannot be filtered by topic")]
    Anonymous(String),

    #[error("parameter `{param}` of event {event} has an unsupported type: {source}")]
    UnsupportedType {
        event: String,
        param: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },

    #[error("ABI defines no event that can be scanned for")]
    NoEvents,
}

/// The event signatures of one contract interface.
///
/// Immutable once built. Iteration order is the ABI's event order as exposed by
/// [`JsonAbi::events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignatureSet {
    signatures: Vec<EventSignature>,
}

impl EventSignatureSet {
    /// Builds a set from explicit signatures.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::NoEvents`] if `signatures` is empty.
    pub fn new(signatures: Vec<EventSignature>) -> Result<Self, SignatureError> {
        if signatures.is_empty() {
            return Err(SignatureError::NoEvents);
        }
        Ok(Self { signatures })
    }

    /// Builds a set from every event of `abi`.
    ///
    /// Anonymous events are skipped since a log query cannot select them by topic hash.
    ///
    /// # Errors
    ///
    /// Returns an error if an event parameter type cannot be resolved or no usable event remains.
    pub fn from_abi(abi: &JsonAbi) -> Result<Self, SignatureError> {
        let mut signatures = Vec::new();
        for event in abi.events() {
            match EventSignature::try_from(event) {
                Ok(signature) => signatures.push(signature),
                Err(SignatureError::Anonymous(name)) => {
                    warn!(event = %name, "Skipping anonymous event");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(event_count = signatures.len(), "Loaded event signatures");
        Self::new(signatures)
    }

    /// Parses a JSON ABI: either a bare ABI array or a compiler artifact with an `abi` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or defines no usable event.
    pub fn from_json_str(json: &str) -> Result<Self, SignatureError> {
        let value: Value = serde_json::from_str(json)?;
        let abi_value = match value {
            Value::Object(mut artifact) if artifact.contains_key("abi") => {
                artifact.remove("abi").unwrap_or(Value::Null)
            }
            other => other,
        };
        let abi: JsonAbi = serde_json::from_value(abi_value)?;
        Self::from_abi(&abi)
    }

    /// Reads and parses a JSON ABI file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is not a usable ABI.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The ERC-721 events: `Transfer`, `Approval` and `ApprovalForAll`.
    ///
    /// # Panics
    ///
    /// Never in practice: the bundled ABI is checked by this crate's tests.
    #[must_use]
    pub fn erc721() -> Self {
        Self::from_json_str(ERC721_ABI).expect("bundled ERC-721 ABI is valid")
    }

    /// Looks up a signature by event name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&EventSignature> {
        self.signatures.iter().find(|signature| signature.name() == name)
    }

    /// Looks up a signature by selector.
    #[must_use]
    pub fn by_selector(&self, selector: B256) -> Option<&EventSignature> {
        self.signatures.iter().find(|signature| signature.selector() == selector)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, EventSignature> {
        self.signatures.iter()
    }
}

impl<'a> IntoIterator for &'a EventSignatureSet {
    type Item = &'a EventSignature;
    type IntoIter = slice::Iter<'a, EventSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

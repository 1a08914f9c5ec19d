//! Address-Scanner discovers which contracts emitted a known set of EVM events, block by block.
//!
//! The main entry point is [`RangeScanner`], built via [`RangeScannerBuilder`] from an
//! [`EventSignatureSet`] and a [`node::NodeClient`] such as [`node::RobustNode`].
//!
//! # Fetching and streaming
//!
//! [`RangeScanner::fetch`] answers for one block range at once. [`RangeScanner::stream`] walks from
//! a starting block up to the chain head, splitting the span into sub-ranges that respect the
//! node's maximum log-query width.
//!
//! Both produce [`BlockAddressGroup`]s: one per block, in increasing block order, holding the
//! distinct addresses whose logs decoded under at least one signature. Blocks without matches
//! still get an (empty) group.
//!
//! # Signature matching
//!
//! A log matches a signature only if its first topic is the signature's selector *and* the rest of
//! the log decodes under the signature's parameter layout (see [`decode`]). ERC-20 and ERC-721
//! `Transfer` share a selector but not a layout, so only the ERC-721 form matches the bundled
//! [`EventSignatureSet::erc721`] set.
//!
//! # Failures
//!
//! A failed log query fails the whole range ([`ScannerError::QueryFailure`]); no partial result is
//! produced. A stream yields that error once and then ends.

#[macro_use]
mod logging;

pub mod decoder;
pub mod node;
pub mod range_scanner;
pub mod signatures;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod error;
mod types;

pub use decoder::{DecodeMismatch, EventSignature, decode};
pub use error::ScannerError;
pub use range_scanner::{
    AddressStream, DEFAULT_STEP, RangeScanner, RangeScannerBuilder, ScanCursor,
};
pub use signatures::{EventSignatureSet, SignatureError};
pub use types::{BlockAddressGroup, BlockScanResult};

use crate::{
    ScannerError,
    node::NodeClient,
    range_scanner::{DEFAULT_STEP, scanner::RangeScanner},
    signatures::EventSignatureSet,
};

/// Builder/configuration for [`RangeScanner`].
#[derive(Clone, Debug)]
pub struct RangeScannerBuilder {
    /// Event signatures whose emitters are collected.
    pub signatures: Option<EventSignatureSet>,
    /// Streamed sub-ranges cover `step + 1` blocks at most.
    pub step: u64,
}

impl Default for RangeScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeScannerBuilder {
    /// Creates a builder with [`DEFAULT_STEP`] and no signatures.
    #[must_use]
    pub fn new() -> Self {
        Self { signatures: None, step: DEFAULT_STEP }
    }

    /// Sets the event signatures to scan for.
    #[must_use]
    pub fn signatures(mut self, signatures: EventSignatureSet) -> Self {
        self.signatures = Some(signatures);
        self
    }

    /// Sets the provider-imposed step: every streamed log query covers at most `step + 1` blocks.
    #[must_use]
    pub fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Binds the configuration to a node client.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::NoEventSignatures`] if no signature set was provided.
    pub fn connect<C: NodeClient>(self, node: C) -> Result<RangeScanner<C>, ScannerError> {
        let signatures = self.signatures.ok_or(ScannerError::NoEventSignatures)?;
        debug!(signature_count = signatures.len(), step = self.step, "Range scanner configured");
        Ok(RangeScanner { node, signatures, step: self.step })
    }
}

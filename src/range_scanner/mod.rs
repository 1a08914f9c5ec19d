mod builder;
mod cursor;
mod scanner;
mod stream;

pub use builder::RangeScannerBuilder;
pub use cursor::ScanCursor;
pub use scanner::RangeScanner;
pub use stream::AddressStream;

/// Default provider-imposed step. Streamed log queries then cover at most ten blocks.
pub const DEFAULT_STEP: u64 = 9;

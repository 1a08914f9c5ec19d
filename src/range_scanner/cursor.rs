use std::ops::RangeInclusive;

use alloy::primitives::BlockNumber;

/// Position of an in-progress stream.
///
/// Yields the sub-ranges `[next, min(next + step, chain_head)]` in order until the next block
/// passes the chain head recorded when the cursor was created. Each sub-range spans at most
/// `step + 1` blocks, and consecutive sub-ranges neither overlap nor leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    next_block: BlockNumber,
    chain_head: BlockNumber,
    step: u64,
    exhausted: bool,
    batch_count: u64,
}

impl ScanCursor {
    #[must_use]
    pub fn new(from_block: BlockNumber, chain_head: BlockNumber, step: u64) -> Self {
        Self {
            next_block: from_block,
            chain_head,
            step,
            exhausted: from_block > chain_head,
            batch_count: 0,
        }
    }

    /// The first block of the next sub-range.
    #[must_use]
    pub fn next_block(&self) -> BlockNumber {
        self.next_block
    }

    /// The chain head recorded when the stream started.
    #[must_use]
    pub fn chain_head(&self) -> BlockNumber {
        self.chain_head
    }

    /// Returns `true` once every block up to the chain head has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of sub-ranges handed out so far.
    #[must_use]
    pub fn batch_count(&self) -> u64 {
        self.batch_count
    }
}

impl Iterator for ScanCursor {
    type Item = RangeInclusive<BlockNumber>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let start = self.next_block;
        let end = start.saturating_add(self.step).min(self.chain_head);

        match end.checked_add(1) {
            Some(next) if next <= self.chain_head => self.next_block = next,
            _ => self.exhausted = true,
        }

        self.batch_count += 1;
        if self.batch_count % 10 == 0 {
            debug!(batch_count = self.batch_count, next_block = self.next_block, "Scanned batches");
        }

        Some(start..=end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining = match self.step.checked_add(1) {
            Some(width) => (self.chain_head - self.next_block) / width + 1,
            None => 1,
        };
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_span_into_step_plus_one_blocks() {
        let mut cursor = ScanCursor::new(100, 124, 9);
        assert_eq!(cursor.next(), Some(100..=109));
        assert_eq!(cursor.next(), Some(110..=119));
        assert_eq!(cursor.next(), Some(120..=124));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn exact_boundary() {
        let mut cursor = ScanCursor::new(0, 19, 9);
        assert_eq!(cursor.next(), Some(0..=9));
        assert_eq!(cursor.next(), Some(10..=19));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn single_block_at_head() {
        let mut cursor = ScanCursor::new(50, 50, 9);
        assert_eq!(cursor.next(), Some(50..=50));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn start_past_head_yields_nothing() {
        let mut cursor = ScanCursor::new(51, 50, 9);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn zero_step_walks_block_by_block() {
        let mut cursor = ScanCursor::new(3, 5, 0);
        assert_eq!(cursor.next(), Some(3..=3));
        assert_eq!(cursor.next(), Some(4..=4));
        assert_eq!(cursor.next(), Some(5..=5));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn does_not_overflow_at_max_block() {
        let mut cursor = ScanCursor::new(u64::MAX - 1, u64::MAX, 9);
        assert_eq!(cursor.next(), Some(u64::MAX - 1..=u64::MAX));
        assert_eq!(cursor.next(), None);

        let mut cursor = ScanCursor::new(0, u64::MAX, u64::MAX);
        assert_eq!(cursor.next(), Some(0..=u64::MAX));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn size_hint_counts_remaining_batches() {
        let mut cursor = ScanCursor::new(0, 24, 9);
        assert_eq!(cursor.size_hint(), (3, Some(3)));
        cursor.next();
        assert_eq!(cursor.size_hint(), (2, Some(2)));
        cursor.by_ref().for_each(drop);
        assert_eq!(cursor.size_hint(), (0, Some(0)));
    }

    #[test]
    fn tracks_position_and_batch_count() {
        let mut cursor = ScanCursor::new(10, 40, 9);
        assert_eq!(cursor.batch_count(), 0);
        assert_eq!(cursor.chain_head(), 40);

        cursor.next();
        assert_eq!(cursor.batch_count(), 1);
        assert_eq!(cursor.next_block(), 20);

        cursor.next();
        assert_eq!(cursor.batch_count(), 2);
        assert_eq!(cursor.next_block(), 30);
    }
}

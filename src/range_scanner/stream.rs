use std::collections::VecDeque;

use alloy::primitives::BlockNumber;
use futures::{Stream, stream};
use tokio_util::sync::CancellationToken;

use crate::{
    node::NodeClient,
    range_scanner::{cursor::ScanCursor, scanner::RangeScanner},
    types::{BlockAddressGroup, BlockScanResult},
};

/// Pull-based stream of [`BlockAddressGroup`]s created by
/// [`RangeScanner::stream`].
///
/// Groups of the current sub-range are buffered and handed out one per [`next`](Self::next) call;
/// the next sub-range is fetched only once the buffer is empty. Nothing runs in the background, so
/// dropping the stream is all the cleanup needed.
///
/// After the last block up to the recorded chain head, or after the first error, `next` returns
/// `None`.
#[derive(Debug)]
pub struct AddressStream<'a, C> {
    scanner: &'a RangeScanner<C>,
    cursor: ScanCursor,
    pending: VecDeque<BlockAddressGroup>,
    done: bool,
}

impl<'a, C: NodeClient> AddressStream<'a, C> {
    pub(crate) fn new(
        scanner: &'a RangeScanner<C>,
        from_block: BlockNumber,
        chain_head: BlockNumber,
    ) -> Self {
        Self {
            scanner,
            cursor: ScanCursor::new(from_block, chain_head, scanner.step),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The scan position: next block to fetch and the chain head the stream stops at.
    #[must_use]
    pub fn cursor(&self) -> &ScanCursor {
        &self.cursor
    }

    /// Returns the next group, fetching the next sub-range first if needed.
    pub async fn next(&mut self) -> Option<BlockScanResult> {
        if let Some(group) = self.pending.pop_front() {
            return Some(Ok(group));
        }
        if self.done {
            return None;
        }

        let Some(range) = self.cursor.next() else {
            self.done = true;
            info!(chain_head = self.cursor.chain_head(), "Address stream reached chain head");
            return None;
        };

        match self.scanner.fetch(*range.start(), *range.end()).await {
            Ok(groups) => {
                self.pending.extend(groups);
                self.pending.pop_front().map(Ok)
            }
            Err(err) => {
                error!(error = %err, "Stopping address stream");
                self.done = true;
                Some(Err(err))
            }
        }
    }

    /// Adapts this state machine into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = BlockScanResult> + 'a {
        stream::unfold(self, |mut groups| async move {
            let item = groups.next().await?;
            Some((item, groups))
        })
    }

    /// Like [`into_stream`](Self::into_stream), but ends as soon as `token` is cancelled, dropping
    /// any in-flight query.
    pub fn into_stream_until_cancelled(
        self,
        token: CancellationToken,
    ) -> impl Stream<Item = BlockScanResult> + 'a {
        stream::unfold((self, token), |(mut groups, token)| async move {
            let next_block = groups.cursor.next_block();
            let item = tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(next_block = next_block, "Address stream cancelled");
                    None
                }
                item = groups.next() => item,
            };
            item.map(|item| (item, (groups, token)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventSignatureSet, range_scanner::RangeScannerBuilder, test_utils::MockNode};
    use tokio_stream::StreamExt;

    fn scanner(node: MockNode, step: u64) -> RangeScanner<MockNode> {
        RangeScannerBuilder::new()
            .step(step)
            .signatures(EventSignatureSet::erc721())
            .connect(node)
            .expect("signatures are set")
    }

    #[tokio::test]
    async fn fetches_lazily_one_sub_range_at_a_time() {
        let scanner = scanner(MockNode::new(30), 9);
        let mut stream = scanner.stream(0).await.expect("head is available");

        assert!(scanner.node().log_queries().is_empty());

        assert_eq!(stream.next().await.expect("group"), BlockAddressGroup::empty(0));
        assert_eq!(scanner.node().log_queries().len(), 3);

        for block in 1..=9 {
            assert_eq!(stream.next().await.expect("group"), BlockAddressGroup::empty(block));
        }
        assert_eq!(scanner.node().log_queries().len(), 3);

        assert_eq!(stream.next().await.expect("group"), BlockAddressGroup::empty(10));
        assert_eq!(scanner.node().log_queries().len(), 6);
        assert_eq!(stream.cursor().next_block(), 20);
    }

    #[tokio::test]
    async fn start_above_head_ends_immediately() {
        let scanner = scanner(MockNode::new(5), 9);
        let mut stream = scanner.stream(6).await.expect("head is available");

        assert!(stream.next().await.is_none());
        assert!(scanner.node().log_queries().is_empty());
    }

    #[tokio::test]
    async fn adapts_into_a_stream() {
        let scanner = scanner(MockNode::new(12), 4);
        let stream = scanner.stream(3).await.expect("head is available").into_stream();

        let blocks: Vec<_> =
            stream.map(|group| group.expect("no failure").block_number).collect().await;

        assert_eq!(blocks, (3..=12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_stream() {
        let scanner = scanner(MockNode::new(100), 9);
        let token = CancellationToken::new();
        let groups = scanner.stream(0).await.expect("head is available");
        let mut stream = Box::pin(groups.into_stream_until_cancelled(token.clone()));

        assert!(stream.next().await.is_some());
        token.cancel();

        assert!(stream.next().await.is_none());
        assert_eq!(scanner.node().log_queries().len(), 3);
    }
}

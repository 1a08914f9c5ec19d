use std::ops::RangeInclusive;

use alloy::primitives::{B256, BlockNumber};

use crate::node::LogQuery;

/// Asserts that the next stream item is `Ok` and equal to the expected
/// [`BlockAddressGroup`](crate::BlockAddressGroup).
///
/// The expected value may be a group or a `(block_number, addresses)` tuple.
#[macro_export]
macro_rules! assert_next_group {
    ($stream: expr, $expected: expr) => {
        $crate::assert_next_group!($stream, $expected, timeout = 5)
    };
    ($stream: expr, $expected: expr, timeout = $secs: expr) => {
        let item = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        let expected = $crate::BlockAddressGroup::from($expected);
        match item {
            std::option::Option::Some(std::result::Result::Ok(group)) => {
                assert_eq!(group, expected, "Expected {:?}, got {:?}", expected, group);
            }
            std::option::Option::Some(std::result::Result::Err(e)) => {
                panic!("Expected Ok({:?}), got Err({:?})", expected, e);
            }
            std::option::Option::None => {
                panic!("Expected Ok({:?}), but the stream ended", expected);
            }
        }
    };
}

/// Asserts that the next stream item is an error matching the given pattern.
#[macro_export]
macro_rules! assert_next_error {
    ($stream: expr, $pattern: pat) => {
        $crate::assert_next_error!($stream, $pattern, timeout = 5)
    };
    ($stream: expr, $pattern: pat, timeout = $secs: expr) => {
        let item = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        match item {
            std::option::Option::Some(std::result::Result::Err(e)) => {
                assert!(matches!(e, $pattern), "Unexpected error {:?}", e);
            }
            std::option::Option::Some(std::result::Result::Ok(group)) => {
                panic!("Expected an error, got Ok({:?})", group);
            }
            std::option::Option::None => {
                panic!("Expected an error, but the stream ended");
            }
        }
    };
}

/// Asserts that the stream has ended.
#[macro_export]
macro_rules! assert_stream_end {
    ($stream: expr) => {
        $crate::assert_stream_end!($stream, timeout = 5)
    };
    ($stream: expr, timeout = $secs: expr) => {
        let item = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        assert!(item.is_none(), "Expected the stream to end, got {:?}", item);
    };
}

/// Asserts that the log queries issued for `selector` tile `expected_range` in order, each
/// spanning at most `max_span` blocks.
///
/// # Panics
///
/// * **Gap or overlap**: a query does not start right after the previous one ended.
/// * **Too wide**: a query spans more than `max_span` blocks.
/// * **Incomplete**: the queries stop before the end of `expected_range`, or go past it.
pub fn assert_query_coverage(
    queries: &[LogQuery],
    selector: B256,
    expected_range: RangeInclusive<BlockNumber>,
    max_span: u64,
) {
    let ranges: Vec<_> =
        queries.iter().filter(|query| query.event_selector == selector).collect();
    let mut next = *expected_range.start();

    for query in &ranges {
        assert_eq!(
            query.from_block, next,
            "Query {:?} does not continue at block {next}\nAll queries:\n{ranges:#?}",
            query.range()
        );
        assert!(
            query.block_span() <= max_span,
            "Query {:?} spans {} blocks, more than {max_span}",
            query.range(),
            query.block_span()
        );
        assert!(
            query.to_block <= *expected_range.end(),
            "Query {:?} goes past {expected_range:?}",
            query.range()
        );
        next = query.to_block + 1;
    }

    assert_eq!(
        next,
        expected_range.end() + 1,
        "Queries stop before covering {expected_range:?}\nAll queries:\n{ranges:#?}"
    );
}

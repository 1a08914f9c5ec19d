use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::{
    primitives::BlockNumber,
    rpc::types::Log,
    transports::TransportErrorKind,
};

use crate::node::{LogQuery, NodeClient, NodeError};

#[derive(Debug, Default)]
struct MockState {
    chain_head: BlockNumber,
    logs: Vec<Log>,
    queries: Vec<LogQuery>,
    filter_by_range: bool,
    fail_head_query: bool,
    failing_block: Option<BlockNumber>,
}

/// In-memory [`NodeClient`] serving a fixed set of logs.
///
/// Log queries return the stored logs whose first topic equals the query's selector and whose
/// block lies in the queried range, in insertion order. Every log query is recorded, including
/// the ones that fail. Clones share state.
#[derive(Debug, Clone)]
pub struct MockNode {
    state: Arc<Mutex<MockState>>,
}

impl MockNode {
    /// Creates a node whose chain head is `chain_head`.
    #[must_use]
    pub fn new(chain_head: BlockNumber) -> Self {
        let state = MockState { chain_head, filter_by_range: true, ..MockState::default() };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Serves logs regardless of the queried range, like a misbehaving node would.
    #[must_use]
    pub fn ignore_range_filter(self) -> Self {
        self.state().filter_by_range = false;
        self
    }

    /// Makes every `get_block_number` call fail.
    #[must_use]
    pub fn fail_head_query(self) -> Self {
        self.state().fail_head_query = true;
        self
    }

    /// Makes every log query whose range includes `block_number` fail.
    #[must_use]
    pub fn fail_queries_covering(self, block_number: BlockNumber) -> Self {
        self.state().failing_block = Some(block_number);
        self
    }

    /// Adds a log to the fixture.
    pub fn push_log(&self, log: Log) {
        self.state().logs.push(log);
    }

    /// Moves the chain head. Streams already created keep the head they started with.
    pub fn set_chain_head(&self, chain_head: BlockNumber) {
        self.state().chain_head = chain_head;
    }

    /// Log queries received so far, oldest first.
    #[must_use]
    pub fn log_queries(&self) -> Vec<LogQuery> {
        self.state().queries.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, query: &LogQuery) -> Result<Vec<Log>, NodeError> {
        let mut state = self.state();
        state.queries.push(*query);

        if state.failing_block.is_some_and(|block| query.range().contains(&block)) {
            return Err(TransportErrorKind::custom_str("log query rejected").into());
        }

        let logs = state
            .logs
            .iter()
            .filter(|log| log.topics().first() == Some(&query.event_selector))
            .filter(|log| {
                !state.filter_by_range
                    || log.block_number.is_some_and(|block| query.range().contains(&block))
            })
            .cloned()
            .collect();
        Ok(logs)
    }
}

impl NodeClient for MockNode {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<Log>, NodeError> {
        self.answer(query)
    }

    async fn get_block_number(&self) -> Result<BlockNumber, NodeError> {
        let state = self.state();
        if state.fail_head_query {
            return Err(NodeError::Timeout);
        }
        Ok(state.chain_head)
    }
}

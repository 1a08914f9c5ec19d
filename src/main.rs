//! Command-line front end: prints, block by block, the contracts that emitted one of the scanned
//! events, from a starting block up to the current chain head.

use std::{num::ParseIntError, path::PathBuf, time::Duration};

use address_scanner::{
    BlockAddressGroup, DEFAULT_STEP, EventSignatureSet, RangeScannerBuilder,
    node::{DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RETRIES, RobustNode, RobustNodeBuilder},
};
use alloy::primitives::BlockNumber;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "address-scanner", version, about)]
struct Args {
    /// JSON-RPC endpoint of the node to scan.
    #[arg(long, env = "ADDRESS_SCANNER_RPC_URL")]
    rpc_url: String,

    /// Endpoints tried in order when the primary one fails.
    #[arg(long = "fallback-rpc-url")]
    fallback_rpc_urls: Vec<String>,

    /// JSON ABI (or compiler artifact) whose events are scanned for. Defaults to ERC-721.
    #[arg(long)]
    abi: Option<PathBuf>,

    /// First block to scan. Prompted for when absent.
    #[arg(long)]
    from_block: Option<BlockNumber>,

    /// Every log query covers at most `step + 1` blocks.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    step: u64,

    /// Total timeout of one node call, retries included.
    #[arg(long, default_value_t = DEFAULT_CALL_TIMEOUT.as_secs())]
    call_timeout_secs: u64,

    /// Retries per endpoint before failing over.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: usize,

    /// Print one JSON object per block instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("`{input}` is not a block number: {source}")]
struct InvalidStartingInput {
    input: String,
    #[source]
    source: ParseIntError,
}

fn parse_start_block(input: &str) -> Result<BlockNumber, InvalidStartingInput> {
    let trimmed = input.trim();
    trimmed
        .replace('_', "")
        .parse()
        .map_err(|source| InvalidStartingInput { input: trimmed.to_owned(), source })
}

/// Asks for the starting block until the answer parses.
async fn prompt_start_block() -> Result<BlockNumber> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"Starting block: ").await?;
        stdout.flush().await?;

        let line = lines.next_line().await?.context("stdin closed before a block was given")?;
        match parse_start_block(&line) {
            Ok(block) => return Ok(block),
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn render(group: &BlockAddressGroup, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(group)?)
    } else {
        Ok(group.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let signatures = match &args.abi {
        Some(path) => EventSignatureSet::from_path(path)
            .with_context(|| format!("failed to load event signatures from {}", path.display()))?,
        None => EventSignatureSet::erc721(),
    };

    let mut builder = RobustNodeBuilder::new(args.rpc_url.clone())
        .call_timeout(Duration::from_secs(args.call_timeout_secs))
        .max_retries(args.max_retries);
    for url in &args.fallback_rpc_urls {
        builder = builder.fallback(url.clone());
    }
    let node: RobustNode = builder.build().await.context("failed to connect to the node")?;

    let scanner = RangeScannerBuilder::new().step(args.step).signatures(signatures).connect(node)?;

    let from_block = match args.from_block {
        Some(block) => block,
        None => prompt_start_block().await?,
    };

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            ctrl_c.cancel();
        }
    });

    let groups = scanner.stream(from_block).await?;
    let chain_head = groups.cursor().chain_head();
    let mut stream = Box::pin(groups.into_stream_until_cancelled(token));

    while let Some(group) = stream.next().await {
        let group = group?;
        if !group.is_empty() {
            println!("{}", render(&group, args.json)?);
        }
    }

    tracing::info!(from_block, chain_head, "Scan finished");
    Ok(())
}

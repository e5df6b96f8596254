// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use anyhow::{Context, Result};
use clap::Parser;
use lockdrop_stats::{
    compute_participation_summary, lookup_address, Deployment, EventCache, ProviderEventSource,
    ProviderOracle, SummaryConfig, LOG_QUERY_CHUNK_SIZE,
};
use url::Url;

/// Arguments for the lockdrop summary.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct LockdropSummaryArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(short, long, env)]
    rpc_url: Url,

    /// Lockdrop deployment to read. Defaults to the known deployment for the chain.
    #[clap(flatten, next_help_heading = "Lockdrop Deployment")]
    deployment: Option<Deployment>,

    /// Block at which signaled balances are read (defaults to latest).
    #[clap(long, env)]
    at_block: Option<u64>,

    /// First block scanned for events (defaults to the deployment's).
    #[clap(long)]
    from_block: Option<u64>,

    /// Last block scanned for events (defaults to latest).
    #[clap(long)]
    to_block: Option<u64>,

    /// Number of blocks per log query.
    #[clap(long, default_value_t = LOG_QUERY_CHUNK_SIZE)]
    chunk_size: u64,

    /// Instead of the summary, list locks and signals made by this address.
    #[clap(long)]
    lookup: Option<String>,

    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = LockdropSummaryArgs::parse();

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    if args.log_json {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let provider = ProviderBuilder::new().connect_client(
        RpcClient::builder().layer(RetryBackoffLayer::new(3, 1000, 200)).http(args.rpc_url),
    );
    let chain_id = provider.get_chain_id().await.context("Failed to get chain ID")?;

    let mut deployment = match args.deployment {
        Some(deployment) => deployment,
        None => Deployment::from_chain_id(chain_id)
            .with_context(|| format!("No lockdrop deployment known for chain {chain_id}"))?,
    };
    if let Some(from_block) = args.from_block {
        deployment.from_block = from_block;
    }
    tracing::info!("Using lockdrop {} on chain {}", deployment.lockdrop_address, chain_id);

    let source = ProviderEventSource::new(provider.clone(), deployment, chain_id)
        .with_to_block(args.to_block)
        .with_chunk_size(args.chunk_size);
    let oracle = ProviderOracle::new(provider);

    let output = match args.lookup {
        Some(address) => {
            let results = lookup_address(&source, &oracle, &address, args.at_block).await?;
            serde_json::to_string_pretty(&results)?
        }
        None => {
            let config = SummaryConfig { at_block: args.at_block };
            let mut cache = EventCache::new();
            match compute_participation_summary(&source, &oracle, &mut cache, &config).await {
                Ok(summary) => serde_json::to_string_pretty(&summary)?,
                Err(err) if err.is_empty_dataset() => {
                    tracing::warn!("No data: the lockdrop has no lock or signal events yet");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }
    };
    println!("{output}");

    Ok(())
}

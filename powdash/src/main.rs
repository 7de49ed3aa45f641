//! # Powdash CLI Entry Point
//!
//! The main executable for the Powergate dashboard. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the log subscriber.
//! 2. **Configuration**: Merges the optional config file with the flags into [`config::Settings`].
//! 3. **Connection**: Opens a gRPC channel to the Powergate node via `powdash_core`.
//! 4. **Execution**: Delegates the command to the matching `powdash_api` service client.
//! 5. **Presentation**: Prints results as pretty JSON on standard output and errors on standard error.

mod cli;
mod config;
mod formatter;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{
    AskCommands, Cli, Commands, DealsCommands, FpaCommands, MinersCommands, ReputationCommands,
    SlashingCommands, WalletCommands,
};
use config::Settings;
use formatter::{FormattedString, GenericError};
use futures_util::{Stream, StreamExt};
use powdash_api::pb::ask::Query;
use powdash_api::pb::deals::DealConfig;
use powdash_api::{ClientConfig, ClientError, Powergate};
use powdash_core::grpc::GrpcTransport;
use serde::Serialize;
use std::path::Path;
use std::process;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_tracing();

    let settings = match Settings::resolve(args.url, args.config.as_deref(), args.headers) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Invalid configuration", format!("{err:#}")))
            );
            process::exit(1);
        }
    };

    let powergate = connect_or_exit(settings).await;

    let result = match args.command {
        Commands::Ask { sub } => ask(&powergate, sub).await,
        Commands::Miners { sub } => miners(&powergate, sub).await,
        Commands::Slashing { sub } => slashing(&powergate, sub).await,
        Commands::Reputation { sub } => reputation(&powergate, sub).await,
        Commands::Wallet { sub } => wallet(&powergate, sub).await,
        Commands::Deals { sub } => deals(&powergate, sub).await,
        Commands::Fpa { sub } => fpa(&powergate, sub).await,
    };

    if let Err(err) = result {
        eprintln!("{}", FormattedString::from(err));
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn connect_or_exit(settings: Settings) -> Powergate {
    match GrpcTransport::connect(&settings.url).await {
        Ok(transport) => {
            tracing::debug!(url = %settings.url, "Connected to Powergate");
            let config = ClientConfig::new(settings.url, transport).with_metadata(settings.metadata);
            Powergate::new(config)
        }
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let value = serde_json::to_value(value).context("Failed to render the response")?;
    println!("{}", FormattedString::from(value));
    Ok(())
}

async fn ask(powergate: &Powergate, command: AskCommands) -> Result<()> {
    match command {
        AskCommands::Get => print_json(&powergate.asks.get().await?),
        AskCommands::Query {
            max_price,
            piece_size,
            limit,
            offset,
        } => {
            let query = Query {
                max_price,
                piece_size,
                limit,
                offset,
            };
            print_json(&powergate.asks.query(query).await?)
        }
    }
}

async fn miners(powergate: &Powergate, command: MinersCommands) -> Result<()> {
    match command {
        MinersCommands::Get => print_json(&powergate.miners.get().await?),
    }
}

async fn slashing(powergate: &Powergate, command: SlashingCommands) -> Result<()> {
    match command {
        SlashingCommands::Get => print_json(&powergate.slashing.get().await?),
    }
}

async fn reputation(powergate: &Powergate, command: ReputationCommands) -> Result<()> {
    match command {
        ReputationCommands::Top { limit } => {
            print_json(&powergate.reputation.top_miners(limit).await?)
        }
        ReputationCommands::AddSource { id, maddr } => {
            powergate.reputation.add_source(&id, &maddr).await?;
            print_json(&serde_json::json!({ "id": id, "maddr": maddr }))
        }
    }
}

async fn wallet(powergate: &Powergate, command: WalletCommands) -> Result<()> {
    match command {
        WalletCommands::New { typ } => {
            let address = powergate.wallet.new_wallet(&typ).await?;
            print_json(&serde_json::json!({ "address": address }))
        }
        WalletCommands::Balance { address } => {
            let balance = powergate.wallet.balance(&address).await?;
            print_json(&serde_json::json!({ "address": address, "balance": balance }))
        }
    }
}

async fn deals(powergate: &Powergate, command: DealsCommands) -> Result<()> {
    match command {
        DealsCommands::Store {
            address,
            miners,
            duration,
            file,
        } => {
            let data = read_file(&file).await?;
            let deal_configs = miners
                .into_iter()
                .map(|(miner, epoch_price)| DealConfig { miner, epoch_price })
                .collect();

            tracing::info!(bytes = data.len(), "Storing {}", file.display());
            let reply = powergate
                .deals
                .store(&address, deal_configs, duration, &data)
                .await?;
            print_json(&reply)
        }
        DealsCommands::Watch { proposals } => {
            let mut updates = powergate.deals.watch(&proposals)?;
            while let Some(info) = updates.next().await {
                print_json(&info?)?;
            }
            Ok(())
        }
        DealsCommands::Retrieve { address, cid, out } => {
            let chunks = powergate.deals.retrieve(&address, &cid)?;
            let bytes = download(chunks, &out).await?;
            print_json(&serde_json::json!({
                "cid": cid,
                "out": out.display().to_string(),
                "bytes": bytes,
            }))
        }
    }
}

async fn fpa(powergate: &Powergate, command: FpaCommands) -> Result<()> {
    match command {
        FpaCommands::Create => print_json(&powergate.fpa.create().await?),
        FpaCommands::Info => print_json(&powergate.fpa.info().await?),
        FpaCommands::Show { cid } => print_json(&powergate.fpa.show(&cid).await?),
        FpaCommands::AddCid { cid } => {
            powergate.fpa.add_cid(&cid).await?;
            print_json(&serde_json::json!({ "cid": cid }))
        }
        FpaCommands::AddFile { file } => {
            let data = read_file(&file).await?;
            let cid = powergate.fpa.add_file(&data).await?;
            print_json(&serde_json::json!({ "cid": cid }))
        }
        FpaCommands::Get { cid, out } => {
            let chunks = powergate.fpa.get(&cid)?;
            let bytes = download(chunks, &out).await?;
            print_json(&serde_json::json!({
                "cid": cid,
                "out": out.display().to_string(),
                "bytes": bytes,
            }))
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))
}

/// Writes every chunk of `chunks` into `out`, returning the number of bytes written.
async fn download<S>(mut chunks: S, out: &Path) -> Result<u64>
where
    S: Stream<Item = Result<Vec<u8>, ClientError>> + Unpin,
{
    let mut file = tokio::fs::File::create(out)
        .await
        .with_context(|| format!("Failed to create '{}'", out.display()))?;

    let mut written = 0u64;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write '{}'", out.display()))?;
        written += chunk.len() as u64;
        tracing::trace!(written, "Received chunk");
    }
    file.flush()
        .await
        .with_context(|| format!("Failed to write '{}'", out.display()))?;

    Ok(written)
}

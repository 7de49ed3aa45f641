//! # CLI
//!
//! This module defines the command-line interface of `powdash` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`
//! and deal configurations are `miner:price`).
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "powdash", version, about = "Powergate dashboard CLI")]
pub struct Cli {
    /// The Powergate URL to connect to (e.g. http://localhost:5002)
    #[arg(long, env = "POWDASH_URL", global = true)]
    pub url: Option<String>,

    /// Path to a JSON config file holding `url` and `metadata`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Metadata sent with every call, as `key:value`
    #[arg(short = 'H', long = "header", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Storage asks published by miners
    Ask {
        #[command(subcommand)]
        sub: AskCommands,
    },

    /// Miner index
    Miners {
        #[command(subcommand)]
        sub: MinersCommands,
    },

    /// Slashing index
    Slashing {
        #[command(subcommand)]
        sub: SlashingCommands,
    },

    /// Miner reputation
    Reputation {
        #[command(subcommand)]
        sub: ReputationCommands,
    },

    /// Wallets held by the node
    Wallet {
        #[command(subcommand)]
        sub: WalletCommands,
    },

    /// Storage and retrieval deals
    Deals {
        #[command(subcommand)]
        sub: DealsCommands,
    },

    /// FFS instance data
    ///
    /// Calls are scoped to the instance named by the `x-ffs-token` header.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// powdash -H x-ffs-token:<token> fpa add-file ./photo.jpg
    /// ```
    Fpa {
        #[command(subcommand)]
        sub: FpaCommands,
    },
}

#[derive(Subcommand)]
pub enum AskCommands {
    /// Show the current ask index
    Get,
    /// Query storage asks
    Query {
        /// Maximum price per epoch
        #[arg(long, default_value_t = 0)]
        max_price: u64,
        /// Piece size the asks must accept
        #[arg(long, default_value_t = 0)]
        piece_size: u64,
        #[arg(long, default_value_t = 0)]
        limit: i32,
        #[arg(long, default_value_t = 0)]
        offset: i32,
    },
}

#[derive(Subcommand)]
pub enum MinersCommands {
    /// Show the current miner index
    Get,
}

#[derive(Subcommand)]
pub enum SlashingCommands {
    /// Show the current slashing index
    Get,
}

#[derive(Subcommand)]
pub enum ReputationCommands {
    /// List the best-scored miners
    Top {
        #[arg(long, default_value_t = 10)]
        limit: i32,
    },
    /// Add a trusted source of miner information
    AddSource {
        id: String,
        /// Multiaddress of the source
        maddr: String,
    },
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a new wallet address
    New {
        /// Key type of the new address
        #[arg(long, default_value = powdash_api::wallet::DEFAULT_KEY_TYPE)]
        typ: String,
    },
    /// Show the balance of an address
    Balance { address: String },
}

#[derive(Subcommand)]
pub enum DealsCommands {
    /// Propose storage deals for a file
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// powdash deals store --address t3abc --miner t01000:500 --miner t01001:450 --duration 1000 ./data.car
    /// ```
    Store {
        /// Wallet address paying for the deals
        #[arg(long)]
        address: String,
        /// Miner and price per epoch, as `miner:price`
        #[arg(long = "miner", value_parser = parse_deal_config, required = true)]
        miners: Vec<(String, u64)>,
        /// Deal duration in epochs
        #[arg(long)]
        duration: u64,
        file: PathBuf,
    },
    /// Follow the state of deal proposals until interrupted
    Watch {
        #[arg(required = true)]
        proposals: Vec<String>,
    },
    /// Retrieve data into a file
    Retrieve {
        /// Wallet address paying for the retrieval
        address: String,
        cid: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum FpaCommands {
    /// Create a new FFS instance
    Create,
    /// Show the instance information
    Info,
    /// Show how a cid is stored
    Show { cid: String },
    /// Pin an existing cid
    AddCid { cid: String },
    /// Upload and pin a file
    AddFile { file: PathBuf },
    /// Download data into a file
    Get {
        cid: String,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}

fn parse_deal_config(s: &str) -> Result<(String, u64), String> {
    // Miner addresses never contain ':', prices come last.
    let (miner, price) = s
        .rsplit_once(':')
        .ok_or_else(|| "Format must be 'miner:price'".to_string())?;

    let miner = miner.trim();
    if miner.is_empty() {
        return Err("Miner address is empty".to_string());
    }

    let price = price
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("Invalid epoch price '{price}': {e}"))?;

    Ok((miner.to_string(), price))
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_header_trims_key_and_value() {
        assert_eq!(
            parse_header("x-ffs-token: abc"),
            Ok(("x-ffs-token".to_string(), "abc".to_string()))
        );
        assert!(parse_header("x-ffs-token").is_err());
    }

    #[test]
    fn parse_deal_config_reads_miner_and_price() {
        assert_eq!(
            parse_deal_config("t01000:500"),
            Ok(("t01000".to_string(), 500))
        );
        assert!(parse_deal_config("t01000").is_err());
        assert!(parse_deal_config(":500").is_err());
        assert!(parse_deal_config("t01000:cheap").is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "powdash",
            "wallet",
            "balance",
            "t3abc",
            "--url",
            "http://localhost:5002",
            "-H",
            "x-ffs-token:abc",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://localhost:5002"));
        assert_eq!(cli.headers, [("x-ffs-token".to_string(), "abc".to_string())]);
        assert!(matches!(
            cli.command,
            Commands::Wallet {
                sub: WalletCommands::Balance { ref address }
            } if address == "t3abc"
        ));
    }

    #[test]
    fn deals_store_requires_a_miner() {
        let result = Cli::try_parse_from([
            "powdash", "deals", "store", "--address", "t3abc", "--duration", "100", "data.car",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "powdash",
            "deals",
            "store",
            "--address",
            "t3abc",
            "--miner",
            "t01000:500",
            "--miner",
            "t01001:450",
            "--duration",
            "100",
            "data.car",
        ])
        .unwrap();

        let Commands::Deals {
            sub: DealsCommands::Store { miners, duration, .. },
        } = cli.command
        else {
            panic!("Expected deals store");
        };
        assert_eq!(miners.len(), 2);
        assert_eq!(miners[1], ("t01001".to_string(), 450));
        assert_eq!(duration, 100);
    }
}

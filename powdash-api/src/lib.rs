//! # Powdash API
//!
//! Typed clients for the seven Powergate services shown by the dashboard. Every service module
//! follows the same layout:
//!
//! * `SERVICE` and an `api` module holding one [`powdash_core::MethodDescriptor`] per RPC.
//! * `ApiClient`: one method per RPC with the callback/handle conventions of
//!   [`powdash_core::client::RpcClient`].
//! * A convenience wrapper ([`ask::Asks`], [`deals::Deals`], [`fpa::Fpa`], [`miner::Miners`],
//!   [`reputation::Reputation`], [`slashing::Slashing`], [`wallet::Wallet`]) with `async`
//!   methods and streams. Wrappers fail with [`ClientError::MissingResponse`] when a reply lacks
//!   a part they need.
//!
//! All clients are built from one [`ClientConfig`], usually through [`Powergate`]:
//!
//! ```rust,no_run
//! use powdash_api::Powergate;
//! use powdash_core::client::ClientConfig;
//! use powdash_core::grpc::GrpcTransport;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = GrpcTransport::connect("http://localhost:5002").await?;
//! let powergate = Powergate::new(ClientConfig::new("http://localhost:5002", transport));
//!
//! let index = powergate.asks.get().await?;
//! println!("median price: {}", index.storage_median_price);
//! # Ok(())
//! # }
//! ```
pub mod ask;
pub mod deals;
pub mod fpa;
pub mod miner;
pub mod pb;
pub mod reputation;
pub mod slashing;
pub mod wallet;

pub use powdash_core::client::{ClientConfig, ClientError};

/// Size of the data chunks sent and received by the file streaming methods.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Every service client, sharing one configuration.
#[derive(Debug, Clone)]
pub struct Powergate {
    pub asks: ask::Asks,
    pub deals: deals::Deals,
    pub fpa: fpa::Fpa,
    pub miners: miner::Miners,
    pub reputation: reputation::Reputation,
    pub slashing: slashing::Slashing,
    pub wallet: wallet::Wallet,
}

impl Powergate {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            asks: ask::Asks::new(config.clone()),
            deals: deals::Deals::new(config.clone()),
            fpa: fpa::Fpa::new(config.clone()),
            miners: miner::Miners::new(config.clone()),
            reputation: reputation::Reputation::new(config.clone()),
            slashing: slashing::Slashing::new(config.clone()),
            wallet: wallet::Wallet::new(config),
        }
    }
}

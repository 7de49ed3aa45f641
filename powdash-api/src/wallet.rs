//! # Wallet (`filecoin.wallet.pb.API`)
use crate::pb::wallet::{
    NewWalletReply, NewWalletRequest, WalletBalanceReply, WalletBalanceRequest,
};
use powdash_core::call::UnaryCall;
use powdash_core::client::{ClientConfig, ClientError, Deferred, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.wallet.pb.API";

/// Key type of new wallets unless told otherwise.
pub const DEFAULT_KEY_TYPE: &str = "bls";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const NEW_WALLET: MethodDescriptor = MethodDescriptor::unary(SERVICE, "NewWallet");
    pub const WALLET_BALANCE: MethodDescriptor = MethodDescriptor::unary(SERVICE, "WalletBalance");
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: RpcClient,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: RpcClient::new(config),
        }
    }

    pub fn new_wallet<F>(
        &self,
        request: &NewWalletRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<NewWalletReply, ClientError>) + Send + 'static,
    {
        self.client
            .unary(&api::NEW_WALLET, request, metadata, callback)
    }

    pub fn wallet_balance<F>(
        &self,
        request: &WalletBalanceRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<WalletBalanceReply, ClientError>) + Send + 'static,
    {
        self.client
            .unary(&api::WALLET_BALANCE, request, metadata, callback)
    }
}

#[derive(Debug, Clone)]
pub struct Wallet {
    api: ApiClient,
}

impl Wallet {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Creates a wallet with a key of type `typ` and returns its address.
    pub async fn new_wallet(&self, typ: &str) -> Result<String, ClientError> {
        let request = NewWalletRequest {
            typ: typ.to_string(),
        };
        let reply: NewWalletReply =
            Deferred::new(|done| self.api.new_wallet(&request, None, done))?.await?;
        Ok(reply.address)
    }

    pub async fn balance(&self, address: &str) -> Result<i64, ClientError> {
        let request = WalletBalanceRequest {
            address: address.to_string(),
        };
        let reply: WalletBalanceReply =
            Deferred::new(|done| self.api.wallet_balance(&request, None, done))?.await?;
        Ok(reply.balance)
    }
}

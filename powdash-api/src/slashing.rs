//! # Slashing Index (`filecoin.slashing.pb.API`)
use crate::pb::slashing::{GetReply, GetRequest, Index};
use powdash_core::call::UnaryCall;
use powdash_core::client::{ClientConfig, ClientError, Deferred, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.slashing.pb.API";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const GET: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Get");
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

    pub fn get<F>(
        &self,
        request: &GetRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<GetReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::GET, request, metadata, callback)
    }
}

#[derive(Debug, Clone)]
pub struct Slashing {
    api: ApiClient,
}

impl Slashing {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the slashing history of every miner, as of the indexed tipset.
    pub async fn get(&self) -> Result<Index, ClientError> {
        let reply: GetReply = Deferred::new(|done| self.api.get(&GetRequest {}, None, done))?.await?;
        reply
            .index
            .ok_or_else(|| ClientError::missing_field(&api::GET, "index"))
    }
}

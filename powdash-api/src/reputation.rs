//! # Miner Reputation (`filecoin.reputation.pb.API`)
use crate::pb::reputation::{
    AddSourceReply, AddSourceRequest, GetTopMinersReply, GetTopMinersRequest, MinerScore,
};
use powdash_core::call::UnaryCall;
use powdash_core::client::{ClientConfig, ClientError, Deferred, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.reputation.pb.API";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const ADD_SOURCE: MethodDescriptor = MethodDescriptor::unary(SERVICE, "AddSource");
    pub const GET_TOP_MINERS: MethodDescriptor = MethodDescriptor::unary(SERVICE, "GetTopMiners");
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

    pub fn add_source<F>(
        &self,
        request: &AddSourceRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<AddSourceReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::ADD_SOURCE, request, metadata, callback)
    }

    pub fn get_top_miners<F>(
        &self,
        request: &GetTopMinersRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<GetTopMinersReply, ClientError>) + Send + 'static,
    {
        self.client
            .unary(&api::GET_TOP_MINERS, request, metadata, callback)
    }
}

#[derive(Debug, Clone)]
pub struct Reputation {
    api: ApiClient,
}

impl Reputation {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Registers another Powergate instance, reachable at multiaddress `maddr`, as a source of
    /// miner data.
    pub async fn add_source(&self, id: &str, maddr: &str) -> Result<(), ClientError> {
        let request = AddSourceRequest {
            id: id.to_string(),
            maddr: maddr.to_string(),
        };
        let _: AddSourceReply =
            Deferred::new(|done| self.api.add_source(&request, None, done))?.await?;
        Ok(())
    }

    /// Returns the `limit` best scored miners.
    pub async fn top_miners(&self, limit: i32) -> Result<Vec<MinerScore>, ClientError> {
        let request = GetTopMinersRequest { limit };
        let reply: GetTopMinersReply =
            Deferred::new(|done| self.api.get_top_miners(&request, None, done))?.await?;
        Ok(reply.top_miners)
    }
}

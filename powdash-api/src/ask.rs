//! # Ask Index (`filecoin.ask.pb.API`)
//!
//! Storage asks published by the miners, as indexed by Powergate.
use crate::pb::ask::{GetReply, GetRequest, Index, Query, QueryReply, QueryRequest, StorageAsk};
use powdash_core::call::UnaryCall;
use powdash_core::client::{ClientConfig, ClientError, Deferred, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.ask.pb.API";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const GET: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Get");
    pub const QUERY: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Query");
}

/// One method per RPC, following the callback conventions of [`RpcClient`].
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

    pub fn query<F>(
        &self,
        request: &QueryRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<QueryReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::QUERY, request, metadata, callback)
    }
}

/// Async access to the ask index.
#[derive(Debug, Clone)]
pub struct Asks {
    api: ApiClient,
}

impl Asks {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the current ask index.
    pub async fn get(&self) -> Result<Index, ClientError> {
        let reply: GetReply = Deferred::new(|done| self.api.get(&GetRequest {}, None, done))?.await?;
        reply
            .index
            .ok_or_else(|| ClientError::missing_field(&api::GET, "index"))
    }

    /// Returns the asks matching `query`.
    pub async fn query(&self, query: Query) -> Result<Vec<StorageAsk>, ClientError> {
        let request = QueryRequest { query: Some(query) };
        let reply: QueryReply = Deferred::new(|done| self.api.query(&request, None, done))?.await?;
        Ok(reply.asks)
    }
}

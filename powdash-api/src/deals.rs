//! # Storage & Retrieval Deals (`filecoin.deals.pb.API`)
//!
//! The only service with streaming methods on both sides:
//!
//! * `Store` is client streaming: the first message carries the [`StoreParams`], the following
//!   ones carry the data in chunks of [`CHUNK_SIZE`] bytes.
//! * `Watch` and `Retrieve` are server streaming.
use crate::CHUNK_SIZE;
use crate::pb::deals::{
    DealConfig, DealInfo, RetrieveReply, RetrieveRequest, StoreParams, StoreReply, StoreRequest,
    WatchReply, WatchRequest, store_request::Payload,
};
use futures_util::{Stream, StreamExt};
use powdash_core::call::{ClientStreamCall, Listeners, ServerStreamCall};
use powdash_core::client::{ClientConfig, ClientError, Deferred, ResponseStream, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.deals.pb.API";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const STORE: MethodDescriptor = MethodDescriptor::client_streaming(SERVICE, "Store");
    pub const WATCH: MethodDescriptor = MethodDescriptor::server_streaming(SERVICE, "Watch");
    pub const RETRIEVE: MethodDescriptor = MethodDescriptor::server_streaming(SERVICE, "Retrieve");
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

    /// Starts a `Store` call. Nothing is sent until the first write.
    pub fn store<F>(
        &self,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<ClientStreamCall<StoreRequest, StoreReply>, ClientError>
    where
        F: FnOnce(Result<StoreReply, ClientError>) + Send + 'static,
    {
        self.client.client_streaming(&api::STORE, metadata, callback)
    }

    pub fn watch(
        &self,
        request: &WatchRequest,
        metadata: Option<Metadata>,
        listeners: Listeners<WatchReply>,
    ) -> Result<ServerStreamCall<WatchRequest, WatchReply>, ClientError> {
        self.client
            .server_streaming(&api::WATCH, request, metadata, listeners)
    }

    pub fn watch_stream(
        &self,
        request: &WatchRequest,
        metadata: Option<Metadata>,
    ) -> Result<ResponseStream<WatchRequest, WatchReply>, ClientError> {
        self.client
            .server_streaming_stream(&api::WATCH, request, metadata)
    }

    pub fn retrieve(
        &self,
        request: &RetrieveRequest,
        metadata: Option<Metadata>,
        listeners: Listeners<RetrieveReply>,
    ) -> Result<ServerStreamCall<RetrieveRequest, RetrieveReply>, ClientError> {
        self.client
            .server_streaming(&api::RETRIEVE, request, metadata, listeners)
    }

    pub fn retrieve_stream(
        &self,
        request: &RetrieveRequest,
        metadata: Option<Metadata>,
    ) -> Result<ResponseStream<RetrieveRequest, RetrieveReply>, ClientError> {
        self.client
            .server_streaming_stream(&api::RETRIEVE, request, metadata)
    }
}

#[derive(Debug, Clone)]
pub struct Deals {
    api: ApiClient,
}

impl Deals {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Proposes storage deals for `data`, paid by wallet `address`, to every miner in
    /// `deal_configs` for `duration` epochs.
    pub async fn store(
        &self,
        address: &str,
        deal_configs: Vec<DealConfig>,
        duration: u64,
        data: &[u8],
    ) -> Result<StoreReply, ClientError> {
        let params = StoreParams {
            address: address.to_string(),
            deal_configs,
            duration,
        };

        let requests = std::iter::once(Payload::StoreParams(params))
            .chain(
                data.chunks(CHUNK_SIZE)
                    .map(|chunk| Payload::Chunk(chunk.to_vec())),
            )
            .map(|payload| StoreRequest {
                payload: Some(payload),
            });

        Deferred::new(|done| self.api.store(None, done))?
            .send_all(requests)
            .await
    }

    /// Follows the state changes of the given deal proposals.
    ///
    /// The stream ends with the call. Dropping it stops watching.
    pub fn watch(
        &self,
        proposals: &[String],
    ) -> Result<impl Stream<Item = Result<DealInfo, ClientError>> + Unpin + Send, ClientError>
    {
        let request = WatchRequest {
            proposals: proposals.to_vec(),
        };
        let stream = self.api.watch_stream(&request, None)?;
        Ok(stream.map(|reply| {
            reply.and_then(|reply| {
                reply
                    .deal_info
                    .ok_or_else(|| ClientError::missing_field(&api::WATCH, "deal_info"))
            })
        }))
    }

    /// Retrieves the data identified by `cid`, paid by wallet `address`, as a stream of chunks.
    pub fn retrieve(
        &self,
        address: &str,
        cid: &str,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, ClientError>> + Unpin + Send, ClientError> {
        let request = RetrieveRequest {
            address: address.to_string(),
            cid: cid.to_string(),
        };
        let stream = self.api.retrieve_stream(&request, None)?;
        Ok(stream.map(|reply| reply.map(|reply| reply.chunk)))
    }
}

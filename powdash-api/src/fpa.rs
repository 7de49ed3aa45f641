//! # FFS Pinning API (`filecoin.fpa.pb.API`)
//!
//! Manages the pinned data of one FFS instance. Files travel as chunks of [`CHUNK_SIZE`] bytes in
//! both directions.
use crate::CHUNK_SIZE;
use crate::pb::fpa::{
    AddCidReply, AddCidRequest, AddFileReply, AddFileRequest, CreateReply, CreateRequest,
    GetReply, GetRequest, InfoReply, InfoRequest, ShowReply, ShowRequest,
};
use futures_util::{Stream, StreamExt};
use powdash_core::call::{ClientStreamCall, Listeners, ServerStreamCall, UnaryCall};
use powdash_core::client::{ClientConfig, ClientError, Deferred, ResponseStream, RpcClient};
use powdash_core::{Metadata, MethodDescriptor};

pub const SERVICE: &str = "filecoin.fpa.pb.API";

pub mod api {
    use super::{MethodDescriptor, SERVICE};

    pub const ADD_CID: MethodDescriptor = MethodDescriptor::unary(SERVICE, "AddCid");
    pub const ADD_FILE: MethodDescriptor = MethodDescriptor::client_streaming(SERVICE, "AddFile");
    pub const GET: MethodDescriptor = MethodDescriptor::server_streaming(SERVICE, "Get");
    pub const CREATE: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Create");
    pub const INFO: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Info");
    pub const SHOW: MethodDescriptor = MethodDescriptor::unary(SERVICE, "Show");
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

    pub fn add_cid<F>(
        &self,
        request: &AddCidRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<AddCidReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::ADD_CID, request, metadata, callback)
    }

    pub fn add_file<F>(
        &self,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<ClientStreamCall<AddFileRequest, AddFileReply>, ClientError>
    where
        F: FnOnce(Result<AddFileReply, ClientError>) + Send + 'static,
    {
        self.client
            .client_streaming(&api::ADD_FILE, metadata, callback)
    }

    pub fn get(
        &self,
        request: &GetRequest,
        metadata: Option<Metadata>,
        listeners: Listeners<GetReply>,
    ) -> Result<ServerStreamCall<GetRequest, GetReply>, ClientError> {
        self.client
            .server_streaming(&api::GET, request, metadata, listeners)
    }

    pub fn get_stream(
        &self,
        request: &GetRequest,
        metadata: Option<Metadata>,
    ) -> Result<ResponseStream<GetRequest, GetReply>, ClientError> {
        self.client
            .server_streaming_stream(&api::GET, request, metadata)
    }

    pub fn create<F>(
        &self,
        request: &CreateRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<CreateReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::CREATE, request, metadata, callback)
    }

    pub fn info<F>(
        &self,
        request: &InfoRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<InfoReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::INFO, request, metadata, callback)
    }

    pub fn show<F>(
        &self,
        request: &ShowRequest,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        F: FnOnce(Result<ShowReply, ClientError>) + Send + 'static,
    {
        self.client.unary(&api::SHOW, request, metadata, callback)
    }
}

#[derive(Debug, Clone)]
pub struct Fpa {
    api: ApiClient,
}

impl Fpa {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Pins data that is already reachable on the IPFS network.
    pub async fn add_cid(&self, cid: &str) -> Result<(), ClientError> {
        let request = AddCidRequest {
            cid: cid.to_string(),
        };
        let _: AddCidReply = Deferred::new(|done| self.api.add_cid(&request, None, done))?.await?;
        Ok(())
    }

    /// Uploads and pins `data`, returning its cid.
    pub async fn add_file(&self, data: &[u8]) -> Result<String, ClientError> {
        let requests = data.chunks(CHUNK_SIZE).map(|chunk| AddFileRequest {
            chunk: chunk.to_vec(),
        });
        let reply: AddFileReply = Deferred::new(|done| self.api.add_file(None, done))?
            .send_all(requests)
            .await?;
        Ok(reply.cid)
    }

    /// Streams the chunks of the data identified by `cid`.
    pub fn get(
        &self,
        cid: &str,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, ClientError>> + Unpin + Send, ClientError> {
        let request = GetRequest {
            cid: cid.to_string(),
        };
        let stream = self.api.get_stream(&request, None)?;
        Ok(stream.map(|reply| reply.map(|reply| reply.chunk)))
    }

    /// Creates a new FFS instance, returning its id and wallet address.
    pub async fn create(&self) -> Result<CreateReply, ClientError> {
        Deferred::new(|done| self.api.create(&CreateRequest {}, None, done))?.await
    }

    pub async fn info(&self) -> Result<InfoReply, ClientError> {
        Deferred::new(|done| self.api.info(&InfoRequest {}, None, done))?.await
    }

    /// Shows how `cid` is stored on the hot and cold layers.
    pub async fn show(&self, cid: &str) -> Result<ShowReply, ClientError> {
        let request = ShowRequest {
            cid: cid.to_string(),
        };
        Deferred::new(|done| self.api.show(&request, None, done))?.await
    }
}

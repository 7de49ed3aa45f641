//! # Typed Client Facade
//!
//! [`RpcClient`] is what per-service clients are built on. It binds a [`ClientConfig`] (the
//! destination, default metadata and transport shared by every service) and exposes one generic
//! entry point per call shape:
//!
//! * [`RpcClient::unary`]: takes the request and a completion callback, returns a
//!   cancel-only handle.
//! * [`RpcClient::client_streaming`]: takes a completion callback, returns a writable handle.
//! * [`RpcClient::server_streaming`]: takes the request and the initial [`Listeners`], returns a
//!   subscribable handle.
//! * [`RpcClient::bidi_streaming`]: returns a writable and subscribable handle.
//!
//! On top of the callback convention, the async convenience layer turns a call into a single
//! awaited value ([`Deferred`], [`RpcClient::unary_async`],
//! [`RpcClient::client_streaming_async`]) or a [`futures_util::Stream`] of responses
//! ([`RpcClient::server_streaming_stream`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use powdash_core::MethodDescriptor;
//! use powdash_core::client::{ClientConfig, RpcClient};
//! use powdash_core::grpc::GrpcTransport;
//!
//! #[derive(Clone, PartialEq, prost::Message)]
//! struct BalanceRequest {
//!     #[prost(string, tag = "1")]
//!     address: String,
//! }
//!
//! #[derive(Clone, PartialEq, prost::Message)]
//! struct BalanceReply {
//!     #[prost(int64, tag = "1")]
//!     balance: i64,
//! }
//!
//! const BALANCE: MethodDescriptor = MethodDescriptor::unary("filecoin.wallet.pb.API", "WalletBalance");
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = GrpcTransport::connect("http://localhost:5002").await?;
//! let client = RpcClient::new(ClientConfig::new("http://localhost:5002", transport));
//!
//! let request = BalanceRequest { address: "t3abc".to_string() };
//! let reply: BalanceReply = client.unary_async(&BALANCE, &request, None).await?;
//! println!("{}", reply.balance);
//! # Ok(())
//! # }
//! ```
mod deferred;
mod stream;

pub use deferred::{Callback, Deferred};
pub use stream::ResponseStream;

use crate::call::{
    self, BidiCall, CallError, CallTarget, ClientStreamCall, Listeners, MisuseError,
    ServerStreamCall, UnaryCall,
};
use crate::{MethodDescriptor, Metadata, ProstCodec, ServiceError, Transport};
use std::fmt;
use std::sync::Arc;

/// Errors surfaced by the typed client facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Call(#[from] CallError),
    /// The call succeeded but the response (or a required part of it) was absent.
    #[error("Method '{method}' returned no {what}")]
    MissingResponse { method: String, what: String },
    #[error(transparent)]
    Misuse(#[from] MisuseError),
}

impl ClientError {
    pub fn missing_response(method: &MethodDescriptor) -> Self {
        ClientError::MissingResponse {
            method: method.to_string(),
            what: "response message".to_string(),
        }
    }

    pub fn missing_field(method: &MethodDescriptor, field: &str) -> Self {
        ClientError::MissingResponse {
            method: method.to_string(),
            what: format!("'{field}' in its response"),
        }
    }

    /// The service error when the call ended with a non-OK status.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            ClientError::Call(CallError::Status(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for ClientError {
    fn from(err: ServiceError) -> Self {
        ClientError::Call(CallError::Status(err))
    }
}

/// Configuration shared by every service client: built once, then cloned into each client.
#[derive(Clone)]
pub struct ClientConfig {
    destination: String,
    metadata: Metadata,
    transport: Arc<dyn Transport>,
}

impl ClientConfig {
    pub fn new(destination: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            destination: destination.into(),
            metadata: Metadata::new(),
            transport: Arc::new(transport),
        }
    }

    /// Metadata attached to every call. Per-call metadata overrides it key by key.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("destination", &self.destination)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Generic typed client over `prost` messages.
#[derive(Debug, Clone)]
pub struct RpcClient {
    config: ClientConfig,
}

impl RpcClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn target(&self, metadata: Option<Metadata>) -> CallTarget {
        let metadata = match metadata {
            Some(metadata) => self.config.metadata.merged(&metadata),
            None => self.config.metadata.clone(),
        };
        CallTarget::new(
            self.config.transport.clone(),
            self.config.destination.clone(),
            metadata,
        )
    }

    /// Performs a unary call. `callback` fires exactly once with the response or the error.
    pub fn unary<Req, Res, F>(
        &self,
        method: &MethodDescriptor,
        request: &Req,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<UnaryCall, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
        F: FnOnce(Result<Res, ClientError>) + Send + 'static,
    {
        let method = *method;
        let call = call::start_unary(
            &method,
            self.target(metadata),
            ProstCodec::<Req, Res>::new(),
            request,
            move |result| callback(single_response(&method, result)),
        )?;
        Ok(call)
    }

    /// Starts a client streaming call. `callback` fires once, after the transport finalizes.
    pub fn client_streaming<Req, Res, F>(
        &self,
        method: &MethodDescriptor,
        metadata: Option<Metadata>,
        callback: F,
    ) -> Result<ClientStreamCall<Req, Res>, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
        F: FnOnce(Result<Res, ClientError>) + Send + 'static,
    {
        let method = *method;
        let call = call::start_client_stream(
            &method,
            self.target(metadata),
            ProstCodec::<Req, Res>::new(),
            move |result| callback(single_response(&method, result)),
        )?;
        Ok(call)
    }

    /// Starts a server streaming call with the handlers that must see every response.
    pub fn server_streaming<Req, Res>(
        &self,
        method: &MethodDescriptor,
        request: &Req,
        metadata: Option<Metadata>,
        listeners: Listeners<Res>,
    ) -> Result<ServerStreamCall<Req, Res>, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
    {
        let call = call::start_server_stream(
            method,
            self.target(metadata),
            ProstCodec::<Req, Res>::new(),
            request,
            listeners,
        )?;
        Ok(call)
    }

    /// Starts a bidirectional streaming call. Subscribe before the first write.
    pub fn bidi_streaming<Req, Res>(
        &self,
        method: &MethodDescriptor,
        metadata: Option<Metadata>,
    ) -> Result<BidiCall<Req, Res>, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
    {
        let call = call::start_bidi(method, self.target(metadata), ProstCodec::<Req, Res>::new())?;
        Ok(call)
    }

    /// Performs a unary call and resolves with its response.
    ///
    /// Dropping the returned future cancels the call.
    pub async fn unary_async<Req, Res>(
        &self,
        method: &MethodDescriptor,
        request: &Req,
        metadata: Option<Metadata>,
    ) -> Result<Res, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
    {
        Deferred::new(|done| self.unary(method, request, metadata, done))?.await
    }

    /// Streams every request of `requests`, half-closes, and resolves with the response.
    ///
    /// When the server ends the call before every request was written, resolves with the
    /// server's status.
    pub async fn client_streaming_async<Req, Res, I>(
        &self,
        method: &MethodDescriptor,
        requests: I,
        metadata: Option<Metadata>,
    ) -> Result<Res, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
        I: IntoIterator<Item = Req>,
    {
        Deferred::new(|done| self.client_streaming(method, metadata, done))?
            .send_all(requests)
            .await
    }

    /// Starts a server streaming call and returns its responses as a stream.
    ///
    /// The stream yields an error item when the call ends with a non-OK status or an undecodable
    /// frame, then terminates. Dropping it cancels the call.
    pub fn server_streaming_stream<Req, Res>(
        &self,
        method: &MethodDescriptor,
        request: &Req,
        metadata: Option<Metadata>,
    ) -> Result<ResponseStream<Req, Res>, ClientError>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Clone + Default + 'static,
    {
        ResponseStream::start(|listeners| {
            self.server_streaming(method, request, metadata, listeners)
        })
    }
}

/// Applies the facade's rule for single-response calls: OK without a message is an error.
fn single_response<Res>(
    method: &MethodDescriptor,
    result: Result<Option<Res>, CallError>,
) -> Result<Res, ClientError> {
    match result {
        Ok(Some(response)) => Ok(response),
        Ok(None) => Err(ClientError::missing_response(method)),
        Err(err) => Err(ClientError::Call(err)),
    }
}

#[cfg(test)]
mod test;

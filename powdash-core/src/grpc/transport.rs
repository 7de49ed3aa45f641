//! # Generic gRPC Transport
//!
//! This module wraps a standard `tonic` client to provide the frame-level [`Transport`] the call
//! engine expects.
//!
//! ## How it works
//!
//! Every call, whatever its shape, runs as one `tonic` bidirectional stream:
//!
//! * **Outbound**: frames passed to [`TransportCall::send`] are queued on an unbounded channel
//!   that backs the request stream. [`TransportCall::finish_send`] drops the sender, which ends
//!   the request stream (half-close).
//! * **Inbound**: a task spawned on the ambient tokio runtime by [`TransportCall::start`] awaits
//!   the response stream, forwards every frame to the [`InboundSink`] and finally reports the
//!   trailers (OK) or the `tonic::Status` the call failed with.
//!
//! Request-side problems (invalid metadata, unparsable destination, client not ready) are
//! reported as a non-OK [`Status`] as well, so the engine sees a single failure channel.
use super::codec::BytesCodec;
use crate::status::code;
use crate::{
    BoxError, InboundSink, MethodDescriptor, Metadata, Status, Transport, TransportCall,
};
use bytes::Bytes;
use http_body::Body as HttpBody;
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::{
    client::GrpcService,
    metadata::{
        KeyAndValueRef, MetadataKey, MetadataMap, MetadataValue,
        errors::{InvalidMetadataKey, InvalidMetadataValue},
    },
    transport::{Channel, Endpoint},
};
use tracing::debug;

/// Errors that can occur when connecting to a gRPC server.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
}

/// Errors that prevent a call from reaching the server. They are reported to the engine as a
/// non-OK [`Status`].
#[derive(thiserror::Error, Debug)]
pub enum GrpcRequestError {
    #[error("Internal error, the client was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
    #[error("Invalid destination '{destination}': '{source}'")]
    InvalidDestination {
        destination: String,
        source: http::uri::InvalidUri,
    },
    #[error("Invalid method path '{path}': '{source}'")]
    InvalidPath {
        path: String,
        source: http::uri::InvalidUri,
    },
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
    #[error("No tokio runtime is available to drive the call")]
    NoRuntime,
}

impl From<GrpcRequestError> for Status {
    fn from(err: GrpcRequestError) -> Self {
        let code = match &err {
            GrpcRequestError::ClientNotReady(_) | GrpcRequestError::NoRuntime => code::UNAVAILABLE,
            GrpcRequestError::InvalidDestination { .. }
            | GrpcRequestError::InvalidMetadataKey { .. }
            | GrpcRequestError::InvalidMetadataValue { .. } => code::INVALID_ARGUMENT,
            GrpcRequestError::InvalidPath { .. } => code::INTERNAL,
        };
        Status::new(code, err.to_string())
    }
}

/// A [`Transport`] backed by a `tonic` service, a [`Channel`] by default.
pub struct GrpcTransport<S = Channel> {
    service: Mutex<S>,
}

impl GrpcTransport<Channel> {
    /// Connects to a gRPC server.
    ///
    /// # Arguments
    ///
    /// * `addr` - The server URI (e.g., `http://localhost:5002`).
    pub async fn connect(addr: &str) -> Result<Self, ConnectError> {
        let endpoint = Endpoint::new(addr.to_string())
            .map_err(|e| ConnectError::InvalidUrl(addr.to_string(), e))?;

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed(addr.to_string(), e))?;

        Ok(Self::from_service(channel))
    }
}

impl<S> GrpcTransport<S> {
    /// Creates a transport from an existing Tonic service/channel.
    pub fn from_service(service: S) -> Self {
        Self {
            service: Mutex::new(service),
        }
    }
}

impl<S> fmt::Debug for GrpcTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcTransport").finish_non_exhaustive()
    }
}

impl<S> Transport for GrpcTransport<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn open(
        &self,
        method: &MethodDescriptor,
        destination: &str,
        metadata: &Metadata,
        sink: Arc<dyn InboundSink>,
    ) -> Arc<dyn TransportCall> {
        let (outbound, requests) = mpsc::unbounded_channel();
        let pending = PendingCall {
            service: self.service.lock().clone(),
            method: *method,
            destination: destination.to_string(),
            metadata: metadata.clone(),
            requests,
            sink,
        };
        Arc::new(GrpcCall {
            pending: Mutex::new(Some(pending)),
            outbound: Mutex::new(Some(outbound)),
            task: Mutex::new(None),
        })
    }
}

/// Everything the call task needs, held until `start`.
struct PendingCall<S> {
    service: S,
    method: MethodDescriptor,
    destination: String,
    metadata: Metadata,
    requests: mpsc::UnboundedReceiver<Bytes>,
    sink: Arc<dyn InboundSink>,
}

impl<S> PendingCall<S>
where
    S: GrpcService<tonic::body::Body> + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    async fn run(self) {
        let PendingCall {
            service,
            method,
            destination,
            metadata,
            requests,
            sink,
        } = self;

        debug!(%method, %destination, "starting gRPC call");
        let status = match drive(
            service,
            &method,
            &destination,
            &metadata,
            requests,
            sink.as_ref(),
        )
        .await
        {
            Ok(status) => status,
            Err(err) => {
                debug!(%method, error = %err, "gRPC call could not be performed");
                Status::from(err)
            }
        };
        sink.on_end(status);
    }
}

struct GrpcCall<S> {
    pending: Mutex<Option<PendingCall<S>>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    task: Mutex<Option<AbortHandle>>,
}

impl<S> TransportCall for GrpcCall<S>
where
    S: GrpcService<tonic::body::Body> + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn start(&self) {
        let Some(pending) = self.pending.lock().take() else {
            return;
        };
        match Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(pending.run());
                *self.task.lock() = Some(task.abort_handle());
            }
            Err(_) => pending.sink.on_end(GrpcRequestError::NoRuntime.into()),
        }
    }

    fn send(&self, frame: Bytes) {
        if let Some(outbound) = self.outbound.lock().as_ref() {
            // A closed receiver means the call already ended; its status is on its way.
            let _ = outbound.send(frame);
        }
    }

    fn finish_send(&self) {
        self.outbound.lock().take();
    }

    fn close(&self) {
        self.pending.lock().take();
        self.outbound.lock().take();
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

async fn drive<S>(
    service: S,
    method: &MethodDescriptor,
    destination: &str,
    metadata: &Metadata,
    requests: mpsc::UnboundedReceiver<Bytes>,
    sink: &dyn InboundSink,
) -> Result<Status, GrpcRequestError>
where
    S: GrpcService<tonic::body::Body> + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    let origin = http::Uri::from_str(destination).map_err(|source| {
        GrpcRequestError::InvalidDestination {
            destination: destination.to_string(),
            source,
        }
    })?;
    let mut client = tonic::client::Grpc::with_origin(service, origin);
    client
        .ready()
        .await
        .map_err(|e| GrpcRequestError::ClientNotReady(e.into()))?;

    let path = http_path(method)?;
    let request = build_request(UnboundedReceiverStream::new(requests), metadata)?;

    let mut inbound = match client.streaming(request, path, BytesCodec).await {
        Ok(response) => response.into_inner(),
        Err(status) => return Ok(status_from_tonic(&status)),
    };

    loop {
        match inbound.message().await {
            Ok(Some(frame)) => sink.on_message(frame),
            Ok(None) => break,
            Err(status) => return Ok(status_from_tonic(&status)),
        }
    }

    match inbound.trailers().await {
        Ok(trailers) => {
            let trailers = trailers
                .map(|map| metadata_from_tonic(&map))
                .unwrap_or_default();
            Ok(Status::ok().with_metadata(trailers))
        }
        Err(status) => Ok(status_from_tonic(&status)),
    }
}

fn http_path(method: &MethodDescriptor) -> Result<http::uri::PathAndQuery, GrpcRequestError> {
    let path = method.path();
    http::uri::PathAndQuery::from_str(&path)
        .map_err(|source| GrpcRequestError::InvalidPath { path, source })
}

fn build_request<T>(
    payload: T,
    metadata: &Metadata,
) -> Result<tonic::Request<T>, GrpcRequestError> {
    let mut request = tonic::Request::new(payload);
    for (k, v) in metadata.iter() {
        let key =
            MetadataKey::from_str(k).map_err(|source| GrpcRequestError::InvalidMetadataKey {
                key: k.to_string(),
                source,
            })?;
        let val = MetadataValue::from_str(v).map_err(|source| {
            GrpcRequestError::InvalidMetadataValue {
                key: k.to_string(),
                source,
            }
        })?;
        request.metadata_mut().append(key, val);
    }
    Ok(request)
}

fn status_from_tonic(status: &tonic::Status) -> Status {
    Status::new(status.code() as i32, status.message())
        .with_metadata(metadata_from_tonic(status.metadata()))
}

fn metadata_from_tonic(map: &MetadataMap) -> Metadata {
    let mut metadata = Metadata::new();
    for entry in map.iter() {
        if let KeyAndValueRef::Ascii(key, value) = entry
            && let Ok(value) = value.to_str()
        {
            metadata.append(key.as_str(), value);
        }
    }
    metadata
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_errors_map_to_status_codes() {
        let status = Status::from(GrpcRequestError::NoRuntime);
        assert_eq!(status.code, code::UNAVAILABLE);

        let source = http::Uri::from_str("not a uri").unwrap_err();
        let status = Status::from(GrpcRequestError::InvalidDestination {
            destination: "not a uri".to_string(),
            source,
        });
        assert_eq!(status.code, code::INVALID_ARGUMENT);
        assert!(status.details.contains("not a uri"));
    }

    #[test]
    fn build_request_rejects_invalid_metadata_keys() {
        let metadata: Metadata = [("bad key", "value")].into_iter().collect();

        let err = build_request((), &metadata).unwrap_err();

        assert!(matches!(err, GrpcRequestError::InvalidMetadataKey { key, .. } if key == "bad key"));
    }

    #[test]
    fn build_request_keeps_every_value() {
        let metadata: Metadata = [("x-tag", "a"), ("x-tag", "b")].into_iter().collect();

        let request = build_request((), &metadata).unwrap();

        let values: Vec<_> = request
            .metadata()
            .get_all("x-tag")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn tonic_status_keeps_code_details_and_metadata() {
        let mut status = tonic::Status::not_found("not found");
        status
            .metadata_mut()
            .insert("reason", MetadataValue::from_static("gone"));

        let status = status_from_tonic(&status);

        assert_eq!(status.code, code::NOT_FOUND);
        assert_eq!(status.details, "not found");
        assert_eq!(status.metadata.get("reason"), Some("gone"));
    }
}

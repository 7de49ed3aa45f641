//! # Transport Contract
//!
//! The engine drives calls through these traits and never touches the network itself. A
//! transport opens one [`TransportCall`] per invocation and reports everything it receives to the
//! [`InboundSink`] it was given: any number of frames, then exactly one terminal [`Status`].
//!
//! Connection failures are not a separate channel. A transport that cannot reach the remote
//! end reports it as a non-OK status through [`InboundSink::on_end`].
use crate::{MethodDescriptor, Metadata, Status};
use bytes::Bytes;
use std::sync::Arc;

/// Receives the inbound side of one call.
///
/// Implementations must tolerate events arriving from any thread, one at a time per call.
pub trait InboundSink: Send + Sync {
    /// One response frame, in arrival order.
    fn on_message(&self, frame: Bytes);

    /// The terminal status. Fired exactly once per call, unless the call was closed first.
    fn on_end(&self, status: Status);
}

/// The outbound side of one call.
///
/// Every operation is fire-and-forget; failures surface through the sink as a status.
pub trait TransportCall: Send + Sync {
    /// Starts the call. Frames sent before `start` are buffered.
    fn start(&self);

    fn send(&self, frame: Bytes);

    /// Half-closes the request side.
    fn finish_send(&self);

    /// Aborts the call. No event needs to be reported afterwards.
    fn close(&self);
}

/// Opens calls against a destination.
pub trait Transport: Send + Sync {
    fn open(
        &self,
        method: &MethodDescriptor,
        destination: &str,
        metadata: &Metadata,
        sink: Arc<dyn InboundSink>,
    ) -> Arc<dyn TransportCall>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn open(
        &self,
        method: &MethodDescriptor,
        destination: &str,
        metadata: &Metadata,
        sink: Arc<dyn InboundSink>,
    ) -> Arc<dyn TransportCall> {
        (**self).open(method, destination, metadata, sink)
    }
}

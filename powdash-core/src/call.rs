//! # Call Engine & Call Handles
//!
//! This module drives a single [`MethodDescriptor`] through a [`Transport`] and a [`Codec`],
//! and hands the caller a handle whose capabilities depend on the [`CallShape`]:
//!
//! | shape            | handle                 | capabilities                                  |
//! |------------------|------------------------|-----------------------------------------------|
//! | unary            | [`UnaryCall`]          | [`Cancelable`] + completion callback          |
//! | client streaming | [`ClientStreamCall`]   | [`Cancelable`] + [`Writable`] + completion    |
//! | server streaming | [`ServerStreamCall`]   | [`Cancelable`] + [`Subscribable`]             |
//! | bidirectional    | [`BidiCall`]           | [`Cancelable`] + [`Writable`] + [`Subscribable`] |
//!
//! ## Lifecycle
//!
//! Every call moves through `Pending -> Active -> {Completed, Cancelled}`. Unary and server
//! streaming calls are opened right away. Request-streamed calls stay `Pending` until the first
//! [`Writable::write`] (or [`Writable::end`]) opens the transport call.
//!
//! For a single call, events are delivered in a total order: `data*`, then `status`, then `end`.
//! Once [`Cancelable::cancel`] returns, no further event is delivered.
use crate::{CallShape, Codec, DecodeError, MethodDescriptor, Metadata, ServiceError, Transport};
use crate::status::code;
use std::fmt;
use std::sync::Arc;

mod engine;
mod handle;

pub use handle::{
    BidiCall, Cancelable, ClientStreamCall, Listeners, ServerStreamCall, Subscribable, UnaryCall,
    Writable,
};

use engine::{Delivery, Engine};

/// Where a call goes: the transport that carries it, the destination it is opened against
/// and the request metadata.
#[derive(Clone)]
pub struct CallTarget {
    pub transport: Arc<dyn Transport>,
    pub destination: String,
    pub metadata: Metadata,
}

impl CallTarget {
    pub fn new(
        transport: Arc<dyn Transport>,
        destination: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            transport,
            destination: destination.into(),
            metadata,
        }
    }
}

impl fmt::Debug for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTarget")
            .field("destination", &self.destination)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Position of a call in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// The transport call is not opened yet (request-streamed calls awaiting their first write).
    Pending,
    /// The transport call is open and no terminal event happened yet.
    Active,
    /// A terminal status was delivered.
    Completed,
    /// The caller cancelled the call, or the engine did after a decode failure.
    Cancelled,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Completed | CallState::Cancelled)
    }
}

/// Errors the engine reports through the completion path or the `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The transport ended the call with a non-OK status.
    #[error("Call failed: {0}")]
    Status(#[from] ServiceError),
    /// A response frame could not be decoded; the call was terminated.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Call was cancelled")]
    Cancelled,
}

impl CallError {
    /// The status code that best describes the error.
    pub fn code(&self) -> i32 {
        match self {
            CallError::Status(err) => err.code,
            CallError::Decode(_) => code::INTERNAL,
            CallError::Cancelled => code::CANCELLED,
        }
    }
}

/// The caller used a handle in a way its call does not allow. Always reported synchronously.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MisuseError {
    #[error("Method '{method}' is {actual}, it cannot be called as {expected}")]
    ShapeMismatch {
        method: String,
        expected: CallShape,
        actual: CallShape,
    },
    #[error("Cannot write after end() was called")]
    WriteAfterEnd,
    #[error("end() was already called")]
    AlreadyEnded,
    #[error("The call is already closed")]
    Closed,
}

fn expect_shape(method: &MethodDescriptor, expected: CallShape) -> Result<(), MisuseError> {
    let actual = method.shape();
    if actual == expected {
        Ok(())
    } else {
        Err(MisuseError::ShapeMismatch {
            method: method.to_string(),
            expected,
            actual,
        })
    }
}

/// Starts a unary call.
///
/// `on_complete` is invoked exactly once: with `Ok(Some(response))` on success, `Ok(None)` when
/// the call succeeded without any response message, or with the error that ended the call
/// (including [`CallError::Cancelled`] if the handle is cancelled first).
pub fn start_unary<C, F>(
    method: &MethodDescriptor,
    target: CallTarget,
    codec: C,
    request: &C::Encode,
    on_complete: F,
) -> Result<UnaryCall, MisuseError>
where
    C: Codec,
    F: FnOnce(Result<Option<C::Decode>, CallError>) + Send + 'static,
{
    expect_shape(method, CallShape::Unary)?;
    let engine = Engine::new(
        *method,
        Box::new(codec),
        target,
        Delivery::Completion(Box::new(on_complete)),
    );
    engine.send_once(request);
    Ok(UnaryCall::new(engine))
}

/// Starts a client streaming call. The transport call is opened by the first write.
///
/// `on_complete` follows the same rules as in [`start_unary`].
pub fn start_client_stream<C, F>(
    method: &MethodDescriptor,
    target: CallTarget,
    codec: C,
    on_complete: F,
) -> Result<ClientStreamCall<C::Encode, C::Decode>, MisuseError>
where
    C: Codec,
    F: FnOnce(Result<Option<C::Decode>, CallError>) + Send + 'static,
{
    expect_shape(method, CallShape::ClientStream)?;
    let engine = Engine::new(
        *method,
        Box::new(codec),
        target,
        Delivery::Completion(Box::new(on_complete)),
    );
    Ok(ClientStreamCall::new(engine))
}

/// Starts a server streaming call.
///
/// The call is opened before this function returns, so `listeners` must already hold every
/// handler that has to observe the first responses. Handlers added later through
/// [`Subscribable`] only see the events that follow their registration.
pub fn start_server_stream<C>(
    method: &MethodDescriptor,
    target: CallTarget,
    codec: C,
    request: &C::Encode,
    listeners: Listeners<C::Decode>,
) -> Result<ServerStreamCall<C::Encode, C::Decode>, MisuseError>
where
    C: Codec,
{
    expect_shape(method, CallShape::ServerStream)?;
    let engine = Engine::new(
        *method,
        Box::new(codec),
        target,
        Delivery::Events(listeners),
    );
    engine.send_once(request);
    Ok(ServerStreamCall::new(engine))
}

/// Starts a bidirectional streaming call. The transport call is opened by the first write, so
/// handlers registered before it observe every response.
pub fn start_bidi<C>(
    method: &MethodDescriptor,
    target: CallTarget,
    codec: C,
) -> Result<BidiCall<C::Encode, C::Decode>, MisuseError>
where
    C: Codec,
{
    expect_shape(method, CallShape::Bidirectional)?;
    let engine = Engine::new(
        *method,
        Box::new(codec),
        target,
        Delivery::Events(Listeners::new()),
    );
    Ok(BidiCall::new(engine))
}

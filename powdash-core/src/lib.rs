//! # Powdash Core
//!
//! `powdash-core` is the call runtime shared by every Powergate dashboard client. It turns a
//! bidirectional byte-frame transport into the four typed call shapes of gRPC (unary,
//! client streaming, server streaming and bidirectional streaming) with the same cancellation,
//! error normalization and completion rules for all of them.
//!
//! ## Key Components
//!
//! * **[`MethodDescriptor`]:** Static declaration of a remote method. Its two streaming flags
//!   select the [`CallShape`] of every call made to it.
//! * **[`call`]:** The call engine and the caller-facing handles ([`call::UnaryCall`],
//!   [`call::ClientStreamCall`], [`call::ServerStreamCall`], [`call::BidiCall`]). Each handle only
//!   exposes the capabilities of its shape ([`call::Cancelable`], [`call::Writable`],
//!   [`call::Subscribable`]).
//! * **[`client::RpcClient`]:** The typed client facade that per-service clients are built on,
//!   together with the [`client::Deferred`] future used by the async convenience layer.
//! * **[`Transport`] & [`Codec`]:** The two collaborators the engine is generic over. The
//!   [`grpc`] module provides a `tonic` backed transport, [`ProstCodec`] handles any `prost`
//!   message.
//!
//! ## Feature Flags
//!
//! * `test-util`: Exposes [`mock::MockTransport`], a scripted in-memory transport.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `tonic` so that service crates use compatible versions.
pub mod call;
pub mod client;
pub mod codec;
pub mod descriptor;
pub mod grpc;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod status;
pub mod transport;

pub use codec::{Codec, DecodeError, ProstCodec};
pub use descriptor::{CallShape, MethodDescriptor};
pub use status::{Metadata, ServiceError, Status, code};
pub use transport::{InboundSink, Transport, TransportCall};

// Re-exports
pub use prost;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

//! # gRPC Transport
//!
//! A [`crate::Transport`] implementation on top of `tonic`.
//!
//! The engine only exchanges raw frames with its transport, so the components here never see
//! typed messages: [`codec::BytesCodec`] passes frames through untouched and
//! [`transport::GrpcTransport`] drives every call shape as a generic bidirectional
//! `tonic` stream.
pub mod codec;
pub mod transport;

pub use transport::{ConnectError, GrpcRequestError, GrpcTransport};

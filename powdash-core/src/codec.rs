//! # Message Codec
//!
//! The engine never looks inside a message: it hands typed requests to a [`Codec`] to get the
//! bytes to send, and hands every inbound frame back to it to get a typed response.
use bytes::Bytes;
use std::fmt;
use std::marker::PhantomData;

/// A received frame could not be turned into a typed message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to decode response message: '{0}'")]
pub struct DecodeError(String);

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<prost::DecodeError> for DecodeError {
    fn from(err: prost::DecodeError) -> Self {
        Self(err.to_string())
    }
}

/// Converts typed messages to and from raw frames.
pub trait Codec: Send + Sync + 'static {
    /// The request type.
    type Encode: Send + 'static;
    /// The response type.
    type Decode: Send + 'static;

    fn encode(&self, item: &Self::Encode) -> Bytes;

    fn decode(&self, frame: Bytes) -> Result<Self::Decode, DecodeError>;
}

/// A [`Codec`] for any pair of `prost` messages.
pub struct ProstCodec<E, D>(PhantomData<fn(E) -> D>);

impl<E, D> ProstCodec<E, D> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E, D> Default for ProstCodec<E, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, D> Clone for ProstCodec<E, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, D> Copy for ProstCodec<E, D> {}

impl<E, D> fmt::Debug for ProstCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProstCodec")
    }
}

impl<E, D> Codec for ProstCodec<E, D>
where
    E: prost::Message + 'static,
    D: prost::Message + Default + 'static,
{
    type Encode = E;
    type Decode = D;

    fn encode(&self, item: &E) -> Bytes {
        Bytes::from(item.encode_to_vec())
    }

    fn decode(&self, frame: Bytes) -> Result<D, DecodeError> {
        Ok(D::decode(frame)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Note {
        #[prost(string, tag = "1")]
        text: String,
        #[prost(uint64, tag = "2")]
        stamp: u64,
    }

    #[test]
    fn prost_codec_decodes_what_it_encodes() {
        let codec = ProstCodec::<Note, Note>::new();
        let note = Note {
            text: "hello".to_string(),
            stamp: 1000,
        };

        let decoded = codec.decode(codec.encode(&note)).unwrap();

        assert_eq!(decoded, note);
    }

    #[test]
    fn prost_codec_rejects_truncated_frames() {
        let codec = ProstCodec::<Note, Note>::new();
        let frame = codec.encode(&Note {
            text: "hello".to_string(),
            stamp: 1,
        });

        let err = codec.decode(frame.slice(..3)).unwrap_err();

        assert!(!err.message().is_empty());
    }
}

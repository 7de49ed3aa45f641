//! # Call Status
//!
//! Every call ends with exactly one [`Status`]. Only the distinction between [`code::OK`] and
//! every other code matters to the engine; the rest of the code space belongs to the transport.
use std::collections::BTreeMap;
use std::fmt;

/// gRPC status codes.
pub mod code {
    pub const OK: i32 = 0;
    pub const CANCELLED: i32 = 1;
    pub const UNKNOWN: i32 = 2;
    pub const INVALID_ARGUMENT: i32 = 3;
    pub const DEADLINE_EXCEEDED: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const ALREADY_EXISTS: i32 = 6;
    pub const PERMISSION_DENIED: i32 = 7;
    pub const RESOURCE_EXHAUSTED: i32 = 8;
    pub const FAILED_PRECONDITION: i32 = 9;
    pub const ABORTED: i32 = 10;
    pub const OUT_OF_RANGE: i32 = 11;
    pub const UNIMPLEMENTED: i32 = 12;
    pub const INTERNAL: i32 = 13;
    pub const UNAVAILABLE: i32 = 14;
    pub const DATA_LOSS: i32 = 15;
    pub const UNAUTHENTICATED: i32 = 16;
}

/// Call metadata (headers or trailers): a multimap of lowercase keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<String, Vec<String>>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value for `key`, keeping any previous values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .entry(key.into().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Sets `key` to a single value, replacing any previous values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .insert(key.into().to_ascii_lowercase(), vec![value.into()]);
    }

    /// Returns the first value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates every `(key, value)` pair, one pair per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a copy of `self` where every key present in `overrides` takes the values from
    /// `overrides`.
    pub fn merged(&self, overrides: &Metadata) -> Metadata {
        let mut merged = self.clone();
        for (key, values) in &overrides.0 {
            merged.0.insert(key.clone(), values.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.append(k, v);
        }
        metadata
    }
}

/// Terminal outcome of a call, produced exactly once by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: i32,
    pub details: String,
    /// Trailing metadata.
    pub metadata: Metadata,
}

impl Status {
    pub fn new(code: i32, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(code::OK, "")
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.code == code::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={} details={:?}", self.code, self.details)
    }
}

/// The uniform error value built from a non-OK [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ServiceError {
    pub message: String,
    pub code: i32,
    pub metadata: Metadata,
}

impl From<Status> for ServiceError {
    fn from(status: Status) -> Self {
        Self {
            message: status.details,
            code: status.code,
            metadata: status.metadata,
        }
    }
}

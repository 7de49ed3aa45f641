use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct StorageAsk {
    #[prost(uint64, tag = "1")]
    pub price: u64,
    #[prost(uint64, tag = "2")]
    pub min_piece_size: u64,
    #[prost(string, tag = "3")]
    pub miner: String,
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
    #[prost(int64, tag = "5")]
    pub expiry: i64,
}

/// Snapshot of the storage asks of every known miner, keyed by miner address.
#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Index {
    #[prost(int64, tag = "1")]
    pub last_updated: i64,
    #[prost(uint64, tag = "2")]
    pub storage_median_price: u64,
    #[prost(map = "string, message", tag = "3")]
    pub storage: HashMap<String, StorageAsk>,
}

/// Filters of an ask query. Zero values mean "no filter".
#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Query {
    #[prost(uint64, tag = "1")]
    pub max_price: u64,
    #[prost(uint64, tag = "2")]
    pub piece_size: u64,
    #[prost(int32, tag = "3")]
    pub limit: i32,
    #[prost(int32, tag = "4")]
    pub offset: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetRequest {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetReply {
    #[prost(message, optional, tag = "1")]
    pub index: Option<Index>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct QueryRequest {
    #[prost(message, optional, tag = "1")]
    pub query: Option<Query>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct QueryReply {
    #[prost(message, repeated, tag = "1")]
    pub asks: Vec<StorageAsk>,
}

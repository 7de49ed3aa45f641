use serde::Serialize;
use std::collections::HashMap;

/// Epochs at which a miner was slashed.
#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Slashes {
    #[prost(uint64, repeated, tag = "1")]
    pub epochs: Vec<u64>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Index {
    #[prost(string, tag = "1")]
    pub tipset_key: String,
    #[prost(map = "string, message", tag = "2")]
    pub miners: HashMap<String, Slashes>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetRequest {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetReply {
    #[prost(message, optional, tag = "1")]
    pub index: Option<Index>,
}

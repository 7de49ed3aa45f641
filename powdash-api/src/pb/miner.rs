use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Location {
    #[prost(string, tag = "1")]
    pub country: String,
    #[prost(double, tag = "2")]
    pub longitude: f64,
    #[prost(double, tag = "3")]
    pub latitude: f64,
}

/// What the network layer knows about a miner.
#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Meta {
    #[prost(int64, tag = "1")]
    pub last_updated: i64,
    #[prost(string, tag = "2")]
    pub user_agent: String,
    #[prost(message, optional, tag = "3")]
    pub location: Option<Location>,
    #[prost(bool, tag = "4")]
    pub online: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct MetaIndex {
    #[prost(uint32, tag = "1")]
    pub online: u32,
    #[prost(uint32, tag = "2")]
    pub offline: u32,
    #[prost(map = "string, message", tag = "3")]
    pub info: HashMap<String, Meta>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Power {
    #[prost(uint64, tag = "1")]
    pub power: u64,
    #[prost(double, tag = "2")]
    pub relative: f64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct ChainIndex {
    #[prost(int64, tag = "1")]
    pub last_updated: i64,
    #[prost(map = "string, message", tag = "2")]
    pub power: HashMap<String, Power>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct Index {
    #[prost(message, optional, tag = "1")]
    pub meta: Option<MetaIndex>,
    #[prost(message, optional, tag = "2")]
    pub chain: Option<ChainIndex>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetRequest {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetReply {
    #[prost(message, optional, tag = "1")]
    pub index: Option<Index>,
}

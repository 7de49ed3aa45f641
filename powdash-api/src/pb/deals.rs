use serde::Serialize;

#[derive(Clone, PartialEq, Eq, prost::Message, Serialize)]
pub struct DealConfig {
    #[prost(string, tag = "1")]
    pub miner: String,
    #[prost(uint64, tag = "2")]
    pub epoch_price: u64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct StoreParams {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(message, repeated, tag = "2")]
    pub deal_configs: Vec<DealConfig>,
    #[prost(uint64, tag = "3")]
    pub duration: u64,
}

/// A `Store` call sends one `StoreParams` first, then the data as chunks.
#[derive(Clone, PartialEq, prost::Message)]
pub struct StoreRequest {
    #[prost(oneof = "store_request::Payload", tags = "1, 2")]
    pub payload: Option<store_request::Payload>,
}

pub mod store_request {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        StoreParams(super::StoreParams),
        #[prost(bytes, tag = "2")]
        Chunk(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct StoreReply {
    #[prost(string, tag = "1")]
    pub data_cid: String,
    #[prost(string, repeated, tag = "2")]
    pub proposal_cids: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub failed_deals: Vec<DealConfig>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct DealInfo {
    #[prost(string, tag = "1")]
    pub proposal_cid: String,
    #[prost(uint64, tag = "2")]
    pub state_id: u64,
    #[prost(string, tag = "3")]
    pub state_name: String,
    #[prost(string, tag = "4")]
    pub miner: String,
    #[prost(bytes, tag = "5")]
    pub piece_cid: Vec<u8>,
    #[prost(uint64, tag = "6")]
    pub size: u64,
    #[prost(uint64, tag = "7")]
    pub price_per_epoch: u64,
    #[prost(uint64, tag = "8")]
    pub duration: u64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct WatchRequest {
    #[prost(string, repeated, tag = "1")]
    pub proposals: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct WatchReply {
    #[prost(message, optional, tag = "1")]
    pub deal_info: Option<DealInfo>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct RetrieveRequest {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(string, tag = "2")]
    pub cid: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RetrieveReply {
    #[prost(bytes, tag = "1")]
    pub chunk: Vec<u8>,
}

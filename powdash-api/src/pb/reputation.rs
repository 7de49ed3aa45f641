use serde::Serialize;

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct MinerScore {
    #[prost(string, tag = "1")]
    pub addr: String,
    #[prost(int32, tag = "2")]
    pub score: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct AddSourceRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub maddr: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct AddSourceReply {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetTopMinersRequest {
    #[prost(int32, tag = "1")]
    pub limit: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetTopMinersReply {
    #[prost(message, repeated, tag = "1")]
    pub top_miners: Vec<MinerScore>,
}

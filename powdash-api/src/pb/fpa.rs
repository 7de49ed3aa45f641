use serde::Serialize;

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct AddCidRequest {
    #[prost(string, tag = "1")]
    pub cid: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct AddCidReply {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AddFileRequest {
    #[prost(bytes, tag = "1")]
    pub chunk: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct AddFileReply {
    #[prost(string, tag = "1")]
    pub cid: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct GetRequest {
    #[prost(string, tag = "1")]
    pub cid: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetReply {
    #[prost(bytes, tag = "1")]
    pub chunk: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct CreateRequest {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct CreateReply {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub address: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct ShowRequest {
    #[prost(string, tag = "1")]
    pub cid: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct InfoRequest {}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct InfoReply {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub wallet: Option<WalletInfo>,
    #[prost(string, repeated, tag = "3")]
    pub pins: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct WalletInfo {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(uint64, tag = "2")]
    pub balance: u64,
}

/// Storage state of one cid, on the hot (IPFS) and cold (Filecoin) layers.
#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct ShowReply {
    #[prost(string, tag = "1")]
    pub cid: String,
    #[prost(int64, tag = "2")]
    pub created: i64,
    #[prost(message, optional, tag = "3")]
    pub hot: Option<show_reply::HotInfo>,
    #[prost(message, optional, tag = "4")]
    pub cold: Option<show_reply::ColdInfo>,
}

pub mod show_reply {
    use serde::Serialize;

    #[derive(Clone, PartialEq, prost::Message, Serialize)]
    pub struct HotInfo {
        #[prost(int64, tag = "1")]
        pub size: i64,
        #[prost(message, optional, tag = "2")]
        pub ipfs: Option<IpfsHotInfo>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize)]
    pub struct IpfsHotInfo {
        #[prost(int64, tag = "1")]
        pub created: i64,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize)]
    pub struct ColdInfo {
        #[prost(message, optional, tag = "1")]
        pub filecoin: Option<FilInfo>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize)]
    pub struct FilInfo {
        #[prost(string, tag = "1")]
        pub payload_cid: String,
        #[prost(int64, tag = "2")]
        pub duration: i64,
        #[prost(message, repeated, tag = "3")]
        pub proposals: Vec<FilStorage>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize)]
    pub struct FilStorage {
        #[prost(string, tag = "1")]
        pub proposal_cid: String,
        #[prost(bool, tag = "2")]
        pub failed: bool,
    }
}

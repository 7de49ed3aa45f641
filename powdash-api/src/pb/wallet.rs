use serde::Serialize;

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct NewWalletRequest {
    /// Key type, `bls` or `secp256k1`.
    #[prost(string, tag = "1")]
    pub typ: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct NewWalletReply {
    #[prost(string, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct WalletBalanceRequest {
    #[prost(string, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize)]
pub struct WalletBalanceReply {
    #[prost(int64, tag = "1")]
    pub balance: i64,
}

//! Wire messages of the Powergate services.
//!
//! Field numbers follow the Powergate protobuf definitions. Every message also derives
//! `serde::Serialize`, so replies can be rendered as JSON as they are.
pub mod ask;
pub mod deals;
pub mod fpa;
pub mod miner;
pub mod reputation;
pub mod slashing;
pub mod wallet;

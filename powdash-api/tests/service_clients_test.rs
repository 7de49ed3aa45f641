use futures_util::StreamExt;
use powdash_api::pb::{ask, deals, fpa, miner, reputation, slashing, wallet};
use powdash_api::{CHUNK_SIZE, ClientConfig, ClientError, Powergate};
use powdash_core::mock::{CallEvent, MockTransport, Reply};
use powdash_core::{Metadata, Status, code};
use prost::Message;
use std::collections::HashMap;

fn setup(transport: &MockTransport) -> Powergate {
    Powergate::new(ClientConfig::new("mock://powergate", transport.clone()))
}

fn sent<M: Message + Default>(transport: &MockTransport) -> Vec<M> {
    transport
        .last_call()
        .expect("No call was opened")
        .sent()
        .into_iter()
        .map(|frame| M::decode(frame).expect("Invalid request frame"))
        .collect()
}

#[tokio::test]
async fn test_asks_get_returns_the_index() {
    let transport = MockTransport::new();
    let index = ask::Index {
        last_updated: 1000,
        storage_median_price: 0,
        storage: HashMap::new(),
    };
    transport.reply(
        &powdash_api::ask::api::GET,
        Reply::messages(&[ask::GetReply {
            index: Some(index.clone()),
        }]),
    );

    let result = setup(&transport).asks.get().await.unwrap();

    assert_eq!(result, index);
    assert_eq!(
        transport.last_call().unwrap().method.path(),
        "/filecoin.ask.pb.API/Get"
    );
}

#[tokio::test]
async fn test_asks_get_without_index_is_missing_response() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::ask::api::GET,
        Reply::messages(&[ask::GetReply { index: None }]),
    );

    let err = setup(&transport).asks.get().await.unwrap_err();

    assert!(matches!(err, ClientError::MissingResponse { .. }));
    assert_eq!(
        err.to_string(),
        "Method 'filecoin.ask.pb.API/Get' returned no 'index' in its response"
    );
}

#[tokio::test]
async fn test_asks_get_not_found() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::ask::api::GET,
        Reply::status(Status::new(code::NOT_FOUND, "not found")),
    );

    let err = setup(&transport).asks.get().await.unwrap_err();

    let service_error = err.service_error().unwrap();
    assert_eq!(service_error.code, 5);
    assert_eq!(service_error.message, "not found");
}

#[tokio::test]
async fn test_asks_query_sends_the_filters() {
    let transport = MockTransport::new();
    let found = ask::StorageAsk {
        price: 10,
        min_piece_size: 256,
        miner: "t01000".to_string(),
        timestamp: 1,
        expiry: 2,
    };
    transport.reply(
        &powdash_api::ask::api::QUERY,
        Reply::messages(&[ask::QueryReply {
            asks: vec![found.clone()],
        }]),
    );
    let query = ask::Query {
        max_price: 50,
        piece_size: 1024,
        limit: 10,
        offset: 0,
    };

    let asks = setup(&transport).asks.query(query.clone()).await.unwrap();

    assert_eq!(asks, [found]);
    assert_eq!(
        sent::<ask::QueryRequest>(&transport),
        [ask::QueryRequest { query: Some(query) }]
    );
}

#[tokio::test]
async fn test_miners_and_slashing_indexes() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::miner::api::GET,
        Reply::messages(&[miner::GetReply {
            index: Some(miner::Index {
                meta: Some(miner::MetaIndex {
                    online: 3,
                    offline: 1,
                    info: HashMap::new(),
                }),
                chain: None,
            }),
        }]),
    );
    transport.reply(
        &powdash_api::slashing::api::GET,
        Reply::messages(&[slashing::GetReply {
            index: Some(slashing::Index {
                tipset_key: "bafy-tipset".to_string(),
                miners: HashMap::from([(
                    "t01000".to_string(),
                    slashing::Slashes { epochs: vec![7, 9] },
                )]),
            }),
        }]),
    );
    let powergate = setup(&transport);

    let miners = powergate.miners.get().await.unwrap();
    let slashes = powergate.slashing.get().await.unwrap();

    assert_eq!(miners.meta.unwrap().online, 3);
    assert_eq!(slashes.miners["t01000"].epochs, [7, 9]);
}

#[tokio::test]
async fn test_reputation_top_miners() {
    let transport = MockTransport::new();
    let score = reputation::MinerScore {
        addr: "t01000".to_string(),
        score: 90,
    };
    transport.reply(
        &powdash_api::reputation::api::GET_TOP_MINERS,
        Reply::messages(&[reputation::GetTopMinersReply {
            top_miners: vec![score.clone()],
        }]),
    );

    let top = setup(&transport).reputation.top_miners(5).await.unwrap();

    assert_eq!(top, [score]);
    assert_eq!(
        sent::<reputation::GetTopMinersRequest>(&transport),
        [reputation::GetTopMinersRequest { limit: 5 }]
    );
}

#[tokio::test]
async fn test_reputation_add_source_accepts_an_empty_reply() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::reputation::api::ADD_SOURCE,
        Reply::messages(&[reputation::AddSourceReply {}]),
    );

    setup(&transport)
        .reputation
        .add_source("pg1", "/ip4/127.0.0.1/tcp/5002")
        .await
        .unwrap();

    assert_eq!(
        sent::<reputation::AddSourceRequest>(&transport),
        [reputation::AddSourceRequest {
            id: "pg1".to_string(),
            maddr: "/ip4/127.0.0.1/tcp/5002".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_wallet_new_and_balance() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::wallet::api::NEW_WALLET,
        Reply::messages(&[wallet::NewWalletReply {
            address: "t3new".to_string(),
        }]),
    );
    transport.reply(
        &powdash_api::wallet::api::WALLET_BALANCE,
        Reply::messages(&[wallet::WalletBalanceReply { balance: 4000 }]),
    );
    let powergate = setup(&transport);

    let address = powergate
        .wallet
        .new_wallet(powdash_api::wallet::DEFAULT_KEY_TYPE)
        .await
        .unwrap();
    let balance = powergate.wallet.balance(&address).await.unwrap();

    assert_eq!(address, "t3new");
    assert_eq!(balance, 4000);
    assert_eq!(
        sent::<wallet::WalletBalanceRequest>(&transport),
        [wallet::WalletBalanceRequest {
            address: "t3new".to_string()
        }]
    );
}

#[tokio::test]
async fn test_deals_store_sends_params_then_chunks() {
    let transport = MockTransport::new();
    let reply = deals::StoreReply {
        data_cid: "bafy-data".to_string(),
        proposal_cids: vec!["bafy-proposal".to_string()],
        failed_deals: vec![],
    };
    transport.reply(&powdash_api::deals::api::STORE, Reply::messages(&[reply.clone()]));
    let config = deals::DealConfig {
        miner: "t01000".to_string(),
        epoch_price: 500,
    };
    let data = vec![7u8; CHUNK_SIZE + 10];

    let result = setup(&transport)
        .deals
        .store("t3abc", vec![config.clone()], 1000, &data)
        .await
        .unwrap();

    assert_eq!(result, reply);

    let requests = sent::<deals::StoreRequest>(&transport);
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0].payload,
        Some(deals::store_request::Payload::StoreParams(deals::StoreParams {
            address: "t3abc".to_string(),
            deal_configs: vec![config],
            duration: 1000,
        }))
    );
    assert_eq!(
        requests[1].payload,
        Some(deals::store_request::Payload::Chunk(vec![7u8; CHUNK_SIZE]))
    );
    assert_eq!(
        requests[2].payload,
        Some(deals::store_request::Payload::Chunk(vec![7u8; 10]))
    );
    assert_eq!(
        transport.last_call().unwrap().events().last(),
        Some(&CallEvent::FinishSend)
    );
}

#[tokio::test]
async fn test_deals_store_rejected_after_the_params() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::deals::api::STORE,
        Reply::status(Status::new(code::FAILED_PRECONDITION, "wallet has no funds"))
            .after_sends(1),
    );
    let config = deals::DealConfig {
        miner: "t01000".to_string(),
        epoch_price: 500,
    };
    let data = vec![7u8; CHUNK_SIZE * 3];

    let err = setup(&transport)
        .deals
        .store("t3abc", vec![config], 1000, &data)
        .await
        .unwrap_err();

    let service_error = err.service_error().unwrap();
    assert_eq!(service_error.code, code::FAILED_PRECONDITION);
    assert_eq!(service_error.message, "wallet has no funds");

    let requests = sent::<deals::StoreRequest>(&transport);
    assert_eq!(requests.len(), 1);
    assert!(matches!(
        requests[0].payload,
        Some(deals::store_request::Payload::StoreParams(_))
    ));
}

#[tokio::test]
async fn test_deals_watch_streams_deal_infos() {
    let transport = MockTransport::new();
    let info = |state: &str| deals::DealInfo {
        proposal_cid: "bafy-proposal".to_string(),
        state_name: state.to_string(),
        ..Default::default()
    };
    transport.reply(
        &powdash_api::deals::api::WATCH,
        Reply::messages(&[
            deals::WatchReply {
                deal_info: Some(info("StorageDealProposalAccepted")),
            },
            deals::WatchReply {
                deal_info: Some(info("StorageDealActive")),
            },
            deals::WatchReply { deal_info: None },
        ]),
    );

    let events: Vec<_> = setup(&transport)
        .deals
        .watch(&["bafy-proposal".to_string()])
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], Ok(info("StorageDealProposalAccepted")));
    assert_eq!(events[1], Ok(info("StorageDealActive")));
    assert!(matches!(events[2], Err(ClientError::MissingResponse { .. })));
}

#[tokio::test]
async fn test_deals_retrieve_yields_chunks_then_the_error() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::deals::api::RETRIEVE,
        Reply::new(
            vec![
                deals::RetrieveReply {
                    chunk: b"hello ".to_vec(),
                }
                .encode_to_vec()
                .into(),
            ],
            Status::new(code::UNAVAILABLE, "miner went away"),
        ),
    );

    let chunks: Vec<_> = setup(&transport)
        .deals
        .retrieve("t3abc", "bafy-data")
        .unwrap()
        .collect()
        .await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], Ok(b"hello ".to_vec()));
    let err = chunks[1].as_ref().unwrap_err();
    assert_eq!(err.service_error().unwrap().message, "miner went away");
}

#[tokio::test]
async fn test_fpa_add_file_and_get() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::fpa::api::ADD_FILE,
        Reply::messages(&[fpa::AddFileReply {
            cid: "bafy-file".to_string(),
        }]),
    );
    transport.reply(
        &powdash_api::fpa::api::GET,
        Reply::messages(&[
            fpa::GetReply {
                chunk: b"hello ".to_vec(),
            },
            fpa::GetReply {
                chunk: b"world".to_vec(),
            },
        ]),
    );
    let powergate = setup(&transport);

    let cid = powergate.fpa.add_file(b"hello world").await.unwrap();
    assert_eq!(cid, "bafy-file");
    assert_eq!(
        sent::<fpa::AddFileRequest>(&transport),
        [fpa::AddFileRequest {
            chunk: b"hello world".to_vec()
        }]
    );

    let mut data = Vec::new();
    let mut chunks = powergate.fpa.get(&cid).unwrap();
    while let Some(chunk) = chunks.next().await {
        data.extend(chunk.unwrap());
    }
    assert_eq!(data, b"hello world");
}

#[tokio::test]
async fn test_fpa_add_file_rejected_mid_upload() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::fpa::api::ADD_FILE,
        Reply::status(Status::new(code::RESOURCE_EXHAUSTED, "instance is full"))
            .after_sends(2),
    );
    let data = vec![1u8; CHUNK_SIZE * 4];

    let err = setup(&transport).fpa.add_file(&data).await.unwrap_err();

    let service_error = err.service_error().unwrap();
    assert_eq!(service_error.code, code::RESOURCE_EXHAUSTED);
    assert_eq!(service_error.message, "instance is full");
    assert_eq!(sent::<fpa::AddFileRequest>(&transport).len(), 2);
    assert!(
        !transport
            .last_call()
            .unwrap()
            .events()
            .contains(&CallEvent::FinishSend)
    );
}

#[tokio::test]
async fn test_fpa_unary_methods() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::fpa::api::CREATE,
        Reply::messages(&[fpa::CreateReply {
            id: "ffs-1".to_string(),
            address: "t3ffs".to_string(),
        }]),
    );
    transport.reply(
        &powdash_api::fpa::api::INFO,
        Reply::messages(&[fpa::InfoReply {
            id: "ffs-1".to_string(),
            wallet: Some(fpa::WalletInfo {
                address: "t3ffs".to_string(),
                balance: 12,
            }),
            pins: vec!["bafy-file".to_string()],
        }]),
    );
    transport.reply(
        &powdash_api::fpa::api::ADD_CID,
        Reply::messages(&[fpa::AddCidReply {}]),
    );
    let powergate = setup(&transport);

    let created = powergate.fpa.create().await.unwrap();
    let info = powergate.fpa.info().await.unwrap();
    powergate.fpa.add_cid("bafy-file").await.unwrap();

    assert_eq!(created.id, "ffs-1");
    assert_eq!(info.pins, ["bafy-file"]);
    assert_eq!(info.wallet.unwrap().balance, 12);
}

#[tokio::test]
async fn test_config_metadata_reaches_every_service() {
    let transport = MockTransport::new();
    transport.reply(
        &powdash_api::wallet::api::WALLET_BALANCE,
        Reply::messages(&[wallet::WalletBalanceReply { balance: 1 }]),
    );
    transport.reply(
        &powdash_api::fpa::api::INFO,
        Reply::messages(&[fpa::InfoReply::default()]),
    );
    let metadata: Metadata = [("x-ffs-token", "secret")].into_iter().collect();
    let powergate = Powergate::new(
        ClientConfig::new("mock://powergate", transport.clone()).with_metadata(metadata),
    );

    powergate.wallet.balance("t3abc").await.unwrap();
    powergate.fpa.info().await.unwrap();

    for call in transport.calls() {
        assert_eq!(call.destination, "mock://powergate");
        assert_eq!(call.metadata.get("x-ffs-token"), Some("secret"));
    }
    assert_eq!(transport.calls().len(), 2);
}

use super::*;
use crate::call::{CallState, Cancelable, Writable};
use crate::mock::{CallEvent, MockTransport, Reply};
use crate::{Status, code};
use futures_util::StreamExt;
use prost::Message;

#[derive(Clone, PartialEq, prost::Message)]
struct BalanceRequest {
    #[prost(string, tag = "1")]
    address: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct BalanceReply {
    #[prost(int64, tag = "1")]
    balance: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
struct Chunk {
    #[prost(bytes = "vec", tag = "1")]
    data: Vec<u8>,
}

const BALANCE: MethodDescriptor = MethodDescriptor::unary("test.wallet.API", "Balance");
const UPLOAD: MethodDescriptor = MethodDescriptor::client_streaming("test.files.API", "Upload");
const DOWNLOAD: MethodDescriptor =
    MethodDescriptor::server_streaming("test.files.API", "Download");

fn client(transport: &MockTransport) -> RpcClient {
    RpcClient::new(ClientConfig::new("mock://powergate", transport.clone()))
}

fn request() -> BalanceRequest {
    BalanceRequest {
        address: "t3abc".to_string(),
    }
}

fn chunk(data: &[u8]) -> Chunk {
    Chunk {
        data: data.to_vec(),
    }
}

#[tokio::test]
async fn unary_async_resolves_with_the_response() {
    let transport = MockTransport::new();
    transport.reply(&BALANCE, Reply::messages(&[BalanceReply { balance: 42 }]));

    let reply: BalanceReply = client(&transport)
        .unary_async(&BALANCE, &request(), None)
        .await
        .unwrap();

    assert_eq!(reply.balance, 42);
}

#[tokio::test]
async fn unary_async_without_response_is_missing_response() {
    let transport = MockTransport::new();
    transport.reply(&BALANCE, Reply::status(Status::ok()));

    let err = client(&transport)
        .unary_async::<_, BalanceReply>(&BALANCE, &request(), None)
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::missing_response(&BALANCE));
}

#[tokio::test]
async fn unary_async_surfaces_the_service_error() {
    let transport = MockTransport::new();
    transport.reply(
        &BALANCE,
        Reply::status(Status::new(code::NOT_FOUND, "not found")),
    );

    let err = client(&transport)
        .unary_async::<_, BalanceReply>(&BALANCE, &request(), None)
        .await
        .unwrap_err();

    let service_error = err.service_error().unwrap();
    assert_eq!(service_error.code, code::NOT_FOUND);
    assert_eq!(service_error.message, "not found");
}

#[test]
fn unary_callback_fires_once() {
    let transport = MockTransport::new();
    transport.reply(&BALANCE, Reply::messages(&[BalanceReply { balance: 7 }]));
    let (tx, rx) = std::sync::mpsc::channel();

    client(&transport)
        .unary(&BALANCE, &request(), None, move |result: Result<BalanceReply, _>| {
            tx.send(result).unwrap();
        })
        .unwrap();

    assert_eq!(rx.try_recv().unwrap().unwrap().balance, 7);
    assert!(rx.try_recv().is_err());
}

#[test]
fn unary_rejects_streaming_methods() {
    let transport = MockTransport::new();

    let err = client(&transport)
        .unary(&DOWNLOAD, &request(), None, |_: Result<Chunk, _>| {})
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Misuse(MisuseError::ShapeMismatch { .. })
    ));
    assert!(transport.calls().is_empty());
}

#[test]
fn per_call_metadata_overrides_config_metadata() {
    let transport = MockTransport::new();
    let defaults: Metadata = [("x-ffs-token", "default"), ("x-trace", "1")]
        .into_iter()
        .collect();
    let client = RpcClient::new(
        ClientConfig::new("mock://powergate", transport.clone()).with_metadata(defaults),
    );
    let per_call: Metadata = [("x-ffs-token", "call")].into_iter().collect();

    client
        .unary(&BALANCE, &request(), Some(per_call), |_: Result<BalanceReply, _>| {})
        .unwrap();

    let metadata = transport.last_call().unwrap().metadata.clone();
    assert_eq!(metadata.get_all("x-ffs-token"), ["call"]);
    assert_eq!(metadata.get("x-trace"), Some("1"));
}

#[tokio::test]
async fn dropping_a_deferred_cancels_its_call() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let deferred: Deferred<BalanceReply, UnaryCall> =
        Deferred::new(|done| client.unary(&BALANCE, &request(), None, done)).unwrap();
    assert_eq!(deferred.call().state(), CallState::Active);
    drop(deferred);

    assert!(transport.last_call().unwrap().is_closed());
}

#[tokio::test]
async fn client_streaming_async_writes_every_request() {
    let transport = MockTransport::new();
    transport.reply(&UPLOAD, Reply::messages(&[chunk(b"cid")]));

    let reply: Chunk = client(&transport)
        .client_streaming_async(&UPLOAD, [chunk(b"ab"), chunk(b"cd")], None)
        .await
        .unwrap();

    assert_eq!(reply, chunk(b"cid"));
    let call = transport.last_call().unwrap();
    assert_eq!(call.sent().len(), 2);
}

#[tokio::test]
async fn client_streaming_async_stopped_by_the_server_returns_its_status() {
    let transport = MockTransport::new();
    transport.reply(
        &UPLOAD,
        Reply::status(Status::new(code::FAILED_PRECONDITION, "wallet has no funds"))
            .after_sends(1),
    );

    let result: Result<Chunk, ClientError> = client(&transport)
        .client_streaming_async(&UPLOAD, [chunk(b"ab"), chunk(b"cd"), chunk(b"ef")], None)
        .await;

    let err = result.unwrap_err();
    let service_error = err.service_error().unwrap();
    assert_eq!(service_error.code, code::FAILED_PRECONDITION);
    assert_eq!(service_error.message, "wallet has no funds");

    let call = transport.last_call().unwrap();
    assert_eq!(call.sent().len(), 1);
    assert!(!call.events().contains(&CallEvent::FinishSend));
}

#[tokio::test]
async fn send_all_on_an_ended_call_is_a_misuse() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let deferred: Deferred<Chunk, ClientStreamCall<Chunk, Chunk>> =
        Deferred::new(|done| client.client_streaming(&UPLOAD, None, done)).unwrap();
    deferred.call().end().unwrap();

    let err = deferred.send_all([chunk(b"ab")]).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Misuse(MisuseError::WriteAfterEnd)
    ));
    assert!(transport.last_call().unwrap().is_closed());
}

#[tokio::test]
async fn server_streaming_stream_yields_every_response() {
    let transport = MockTransport::new();
    transport.reply(&DOWNLOAD, Reply::messages(&[chunk(b"ab"), chunk(b"cd")]));

    let stream = client(&transport)
        .server_streaming_stream::<_, Chunk>(&DOWNLOAD, &request(), None)
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items, [Ok(chunk(b"ab")), Ok(chunk(b"cd"))]);
}

#[tokio::test]
async fn server_streaming_stream_ends_with_the_service_error() {
    let transport = MockTransport::new();
    transport.reply(
        &DOWNLOAD,
        Reply::new(
            vec![Chunk::encode_to_vec(&chunk(b"ab")).into()],
            Status::new(code::UNAVAILABLE, "node offline"),
        ),
    );

    let stream = client(&transport)
        .server_streaming_stream::<_, Chunk>(&DOWNLOAD, &request(), None)
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0], Ok(chunk(b"ab")));
    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.service_error().unwrap().code, code::UNAVAILABLE);
}

#[tokio::test]
async fn dropping_a_response_stream_cancels_the_call() {
    let transport = MockTransport::new();

    let mut stream = client(&transport)
        .server_streaming_stream::<_, Chunk>(&DOWNLOAD, &request(), None)
        .unwrap();
    let call = transport.last_call().unwrap();
    call.push_message(Chunk::encode_to_vec(&chunk(b"ab")));

    assert_eq!(stream.next().await, Some(Ok(chunk(b"ab"))));
    drop(stream);

    assert!(call.is_closed());
}

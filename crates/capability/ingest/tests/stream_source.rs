use async_trait::async_trait;
use bridge_config::ListenProtocol;
use bridge_ingest::{
    ConnectionStage, IngestError, PayloadHandler, ReceivedPayload, StreamSource, serve_connection,
};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// 记录收到的报文；内容为 `fail` 时返回处理错误。
struct RecordingHandler {
    tx: mpsc::UnboundedSender<ReceivedPayload>,
}

#[async_trait]
impl PayloadHandler for RecordingHandler {
    async fn handle(&self, payload: ReceivedPayload) -> Result<(), IngestError> {
        let failed = payload.bytes == b"fail";
        let _ = self.tx.send(payload);
        if failed {
            return Err(IngestError::Handler {
                stage: ConnectionStage::Decoding,
                message: "forced failure".to_string(),
            });
        }
        Ok(())
    }
}

fn recording_handler() -> (Arc<dyn PayloadHandler>, mpsc::UnboundedReceiver<ReceivedPayload>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(RecordingHandler { tx }), rx)
}

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<ReceivedPayload>) -> ReceivedPayload {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("payload in time")
        .expect("channel open")
}

async fn send_payload(addr: &str, payload: &[u8]) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(payload).await.expect("write");
    stream.shutdown().await.expect("shutdown");
}

async fn spawn_tcp_source(handler: Arc<dyn PayloadHandler>) -> String {
    let source = StreamSource::bind(ListenProtocol::Tcp, "127.0.0.1:0")
        .await
        .expect("bind");
    let addr = source.local_addr();
    tokio::spawn(source.run(handler));
    addr
}

#[tokio::test]
async fn full_payload_is_delivered_after_eof() {
    let (handler, mut rx) = recording_handler();
    let addr = spawn_tcp_source(handler).await;

    let mut stream = TcpStream::connect(&addr).await.expect("connect");
    stream.write_all(b"{\"client\":").await.expect("write");
    stream.write_all(b"{}}").await.expect("write");
    stream.shutdown().await.expect("shutdown");

    let payload = next_payload(&mut rx).await;
    assert_eq!(payload.bytes, b"{\"client\":{}}");
    assert!(!payload.connection_id.is_empty());
    assert!(payload.peer.starts_with("127.0.0.1:"));
}

#[tokio::test]
async fn stalled_connection_does_not_block_others() {
    let (handler, mut rx) = recording_handler();
    let addr = spawn_tcp_source(handler).await;

    // 保持写端打开，模拟卡住的发送方
    let mut stalled = TcpStream::connect(&addr).await.expect("connect");
    stalled.write_all(b"partial").await.expect("write");

    send_payload(&addr, b"second").await;
    let payload = next_payload(&mut rx).await;
    assert_eq!(payload.bytes, b"second");

    stalled.shutdown().await.expect("shutdown");
    let payload = next_payload(&mut rx).await;
    assert_eq!(payload.bytes, b"partial");
}

#[tokio::test]
async fn handler_failure_does_not_stop_accept_loop() {
    let (handler, mut rx) = recording_handler();
    let addr = spawn_tcp_source(handler).await;

    send_payload(&addr, b"fail").await;
    assert_eq!(next_payload(&mut rx).await.bytes, b"fail");

    send_payload(&addr, b"after").await;
    assert_eq!(next_payload(&mut rx).await.bytes, b"after");
}

#[tokio::test]
async fn tcp4_binds_ipv4_address() {
    let (handler, mut rx) = recording_handler();
    let source = StreamSource::bind(ListenProtocol::Tcp4, "127.0.0.1:0")
        .await
        .expect("bind");
    let addr = source.local_addr();
    tokio::spawn(source.run(handler));

    send_payload(&addr, b"v4").await;
    assert_eq!(next_payload(&mut rx).await.bytes, b"v4");
}

#[tokio::test]
async fn tcp6_rejects_ipv4_only_host() {
    let err = match StreamSource::bind(ListenProtocol::Tcp6, "127.0.0.1:0").await {
        Ok(_) => panic!("tcp6 should not bind an ipv4 address"),
        Err(err) => err,
    };
    assert!(matches!(err, IngestError::Bind { .. }));
    assert_eq!(err.stage(), ConnectionStage::Open);
}

#[cfg(unix)]
#[tokio::test]
async fn unix_socket_source_receives_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bridge.sock");
    let path = path.to_str().expect("utf8 path").to_string();

    let (handler, mut rx) = recording_handler();
    let source = StreamSource::bind(ListenProtocol::Unix, &path)
        .await
        .expect("bind");
    assert_eq!(source.local_addr(), path);
    tokio::spawn(source.run(handler));

    let mut stream = tokio::net::UnixStream::connect(&path).await.expect("connect");
    stream.write_all(b"over unix").await.expect("write");
    stream.shutdown().await.expect("shutdown");

    let payload = next_payload(&mut rx).await;
    assert_eq!(payload.bytes, b"over unix");
    assert_eq!(payload.peer, format!("unix:{path}"));
}

struct BrokenReader;

impl AsyncRead for BrokenReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
    }
}

#[tokio::test]
async fn read_error_skips_handler() {
    let (handler, mut rx) = recording_handler();
    let err = serve_connection(BrokenReader, "broken".to_string(), handler)
        .await
        .expect_err("read error");

    assert!(matches!(err, IngestError::Transport { .. }));
    assert_eq!(err.stage(), ConnectionStage::Reading);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn serve_connection_passes_handler_error_through() {
    let (handler, mut rx) = recording_handler();
    let (mut client, server) = tokio::io::duplex(64);
    client.write_all(b"fail").await.expect("write");
    drop(client);

    let err = serve_connection(server, "duplex".to_string(), handler)
        .await
        .expect_err("handler error");
    assert_eq!(err.stage(), ConnectionStage::Decoding);
    assert_eq!(rx.recv().await.expect("payload").peer, "duplex");
}

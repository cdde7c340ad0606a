//! 监听与连接读取
//!
//! 支持 tcp / tcp4 / tcp6 以及 unix 套接字。每个连接只承载一个事件报文，
//! 发送方写完后关闭写端，服务端读到 EOF 即得到完整报文，不向发送方回写任何数据。

use crate::{ConnectionStage, IngestError, PayloadHandler, ReceivedPayload};
use bridge_config::ListenProtocol;
use bridge_telemetry::{connection_span, new_connection_id};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tracing::{Instrument, debug, error, info, warn};

/// accept 失败后的等待时间，避免 EMFILE 等持续错误时空转。
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

enum BoundListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener, String),
}

/// 流式连接采集源
pub struct StreamSource {
    listener: BoundListener,
}

impl StreamSource {
    /// 按协议绑定监听地址；unix 协议下 `addr` 为套接字路径。
    pub async fn bind(protocol: ListenProtocol, addr: &str) -> Result<Self, IngestError> {
        let bind_error = |reason: String| IngestError::Bind {
            addr: addr.to_string(),
            reason,
        };

        let listener = match protocol {
            ListenProtocol::Tcp => {
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|err| bind_error(err.to_string()))?;
                BoundListener::Tcp(listener)
            }
            ListenProtocol::Tcp4 | ListenProtocol::Tcp6 => {
                let want_v4 = protocol == ListenProtocol::Tcp4;
                let resolved = tokio::net::lookup_host(addr)
                    .await
                    .map_err(|err| bind_error(err.to_string()))?
                    .find(|candidate: &SocketAddr| candidate.is_ipv4() == want_v4)
                    .ok_or_else(|| bind_error(format!("no {protocol} address")))?;
                let listener = TcpListener::bind(resolved)
                    .await
                    .map_err(|err| bind_error(err.to_string()))?;
                BoundListener::Tcp(listener)
            }
            #[cfg(unix)]
            ListenProtocol::Unix => {
                let listener =
                    UnixListener::bind(addr).map_err(|err| bind_error(err.to_string()))?;
                BoundListener::Unix(listener, addr.to_string())
            }
            #[cfg(not(unix))]
            ListenProtocol::Unix => {
                return Err(bind_error("unix sockets are not supported".to_string()));
            }
        };

        Ok(Self { listener })
    }

    /// 实际监听地址（端口为 0 时可取得系统分配的端口）。
    pub fn local_addr(&self) -> String {
        match &self.listener {
            BoundListener::Tcp(listener) => listener
                .local_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
            #[cfg(unix)]
            BoundListener::Unix(_, path) => path.clone(),
        }
    }

    /// 运行 accept 循环；每个连接派生独立任务，循环本身从不等待处理结果。
    pub async fn run(self, handler: Arc<dyn PayloadHandler>) -> Result<(), IngestError> {
        info!(target: "bridge.ingest", addr = %self.local_addr(), "listening");

        loop {
            let accepted = match &self.listener {
                BoundListener::Tcp(listener) => listener
                    .accept()
                    .await
                    .map(|(stream, peer)| spawn_connection(stream, peer.to_string(), &handler)),
                #[cfg(unix)]
                BoundListener::Unix(listener, path) => listener
                    .accept()
                    .await
                    .map(|(stream, _)| spawn_connection(stream, format!("unix:{path}"), &handler)),
            };
            if let Err(err) = accepted {
                accept_failed(&err).await;
            }
        }
    }
}

async fn accept_failed(err: &std::io::Error) {
    error!(target: "bridge.ingest", error = %err, "accept_failed");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

fn spawn_connection<S>(stream: S, peer: String, handler: &Arc<dyn PayloadHandler>)
where
    S: AsyncRead + Unpin + Send + 'static,
{
    let handler = Arc::clone(handler);
    tokio::spawn(async move {
        if let Err(err) = serve_connection(stream, peer, handler).await {
            warn!(
                target: "bridge.ingest",
                stage = %err.stage(),
                error = %err,
                "connection_failed"
            );
        }
    });
}

/// 处理单个连接：读取至 EOF 后交给处理器，返回时连接随之释放。
pub async fn serve_connection<S>(
    mut stream: S,
    peer: String,
    handler: Arc<dyn PayloadHandler>,
) -> Result<(), IngestError>
where
    S: AsyncRead + Unpin,
{
    let connection_id = new_connection_id();
    let span = connection_span(&connection_id, &peer);

    async move {
        debug!(target: "bridge.ingest", "connection_opened");

        let mut bytes = Vec::new();
        if let Err(source) = stream.read_to_end(&mut bytes).await {
            return Err(IngestError::Transport {
                stage: ConnectionStage::Reading,
                source,
            });
        }
        debug!(target: "bridge.ingest", payload_size = bytes.len(), "payload_read");

        let payload = ReceivedPayload {
            connection_id,
            peer,
            bytes,
        };
        let result = handler.handle(payload).await;
        drop(stream);
        debug!(target: "bridge.ingest", stage = %ConnectionStage::Closed, "connection_closed");
        result
    }
    .instrument(span)
    .await
}

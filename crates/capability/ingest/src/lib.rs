//! # 数据接入能力模块
//!
//! 负责监听、接收连接并把每个连接的完整报文交给 [`PayloadHandler`]：
//!
//! ```text
//! StreamSource（accept 循环）
//!       │  每个连接一个 tokio 任务
//!       ▼
//! serve_connection：读取至 EOF
//!       │
//!       ▼
//! PayloadHandler（解码 → 构建 → 写入）
//! ```
//!
//! 连接任务之间不共享可变状态；单个连接的失败只记录日志，不影响 accept 循环。

mod decode;
mod server;

pub use decode::{DecodeError, decode_event};
pub use server::{ACCEPT_ERROR_BACKOFF, StreamSource, serve_connection};

use async_trait::async_trait;
use std::fmt;

/// 单个连接的处理阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStage {
    Open,
    Reading,
    Decoding,
    Building,
    Submitting,
    Closed,
}

impl fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Reading => "reading",
            Self::Decoding => "decoding",
            Self::Building => "building",
            Self::Submitting => "submitting",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("bind {addr} failed: {reason}")]
    Bind { addr: String, reason: String },
    #[error("{stage} failed: {source}")]
    Transport {
        stage: ConnectionStage,
        source: std::io::Error,
    },
    #[error("{stage} failed: {message}")]
    Handler {
        stage: ConnectionStage,
        message: String,
    },
}

impl IngestError {
    /// 出错时所处的阶段。
    pub fn stage(&self) -> ConnectionStage {
        match self {
            Self::Bind { .. } => ConnectionStage::Open,
            Self::Transport { stage, .. } | Self::Handler { stage, .. } => *stage,
        }
    }
}

/// 一个连接读取到的完整报文。
#[derive(Debug, Clone)]
pub struct ReceivedPayload {
    pub connection_id: String,
    pub peer: String,
    pub bytes: Vec<u8>,
}

/// 完整报文处理器，每个连接调用一次。
#[async_trait]
pub trait PayloadHandler: Send + Sync {
    async fn handle(&self, payload: ReceivedPayload) -> Result<(), IngestError>;
}

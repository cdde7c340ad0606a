//! 写入端接口定义

use crate::error::SinkError;
use async_trait::async_trait;
use domain::Batch;

/// 写入回执。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAck {
    /// 本次写入的点位数。
    pub points: usize,
    /// HTTP 状态码；未发生请求时为 None。
    pub status: Option<u16>,
}

/// 接收批量写入的时序库。
#[async_trait]
pub trait PointSink: Send + Sync {
    /// 一次调用提交整个批次，不做重试。
    async fn write(&self, batch: &Batch) -> Result<WriteAck, SinkError>;
}

/// 为每个连接建立新的写入端。
#[async_trait]
pub trait SinkConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn PointSink>, SinkError>;
}

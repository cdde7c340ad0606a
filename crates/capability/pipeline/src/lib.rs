//! 单连接数据流水线：解码 → 构建点位 → 一次批量写入。
//!
//! 流水线只持有构造时注入的配置与写入端连接器，不保存任何跨连接状态。

use bridge_ingest::{ConnectionStage, DecodeError, decode_event};
use bridge_normalize::{BuildReport, build_points_with_report};
use bridge_sink::{SinkConnector, SinkError, WriteAck};
use domain::{Batch, DEFAULT_RETENTION_POLICY};
use std::sync::Arc;
use tracing::{debug, info};

/// Pipeline 处理错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{source} for input {payload}")]
    Decode {
        source: DecodeError,
        payload: String,
    },
    #[error("sink connect error: {0}")]
    Connect(SinkError),
    #[error("write error: {0}")]
    Write(SinkError),
}

impl PipelineError {
    /// 出错时所处的连接阶段。
    pub fn stage(&self) -> ConnectionStage {
        match self {
            Self::Decode { .. } => ConnectionStage::Decoding,
            Self::Connect(_) | Self::Write(_) => ConnectionStage::Submitting,
        }
    }
}

/// Pipeline 参数。
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database: String,
    pub retention_policy: String,
    /// 打印原始报文与写入回执。
    pub log_received: bool,
}

impl PipelineConfig {
    pub fn new(database: impl Into<String>, log_received: bool) -> Self {
        Self {
            database: database.into(),
            retention_policy: DEFAULT_RETENTION_POLICY.to_string(),
            log_received,
        }
    }
}

/// 单次处理结果。
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub client_name: String,
    pub points_written: usize,
    pub lines_skipped: usize,
    pub ack: WriteAck,
}

/// Pipeline 入口。
#[derive(Clone)]
pub struct Pipeline {
    connector: Arc<dyn SinkConnector>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(connector: Arc<dyn SinkConnector>, config: PipelineConfig) -> Self {
        Self { connector, config }
    }

    /// 处理一个连接的完整报文。
    ///
    /// 解码失败时不会连接写入端；写入失败不重试，批次直接丢弃。
    pub async fn process(&self, payload: &[u8]) -> Result<PipelineReport, PipelineError> {
        if self.config.log_received {
            info!(
                target: "bridge.pipeline",
                payload = %String::from_utf8_lossy(payload),
                "payload_received"
            );
        }

        let event = decode_event(payload).map_err(|source| PipelineError::Decode {
            source,
            payload: String::from_utf8_lossy(payload).into_owned(),
        })?;
        debug!(
            target: "bridge.pipeline",
            stage = %ConnectionStage::Decoding,
            client_name = %event.client.name,
            client_address = %event.client.address,
            "event_decoded"
        );

        let BuildReport { points, skipped } = build_points_with_report(&event);
        debug!(
            target: "bridge.pipeline",
            stage = %ConnectionStage::Building,
            points = points.len(),
            skipped,
            "points_built"
        );

        let batch = Batch {
            points,
            database: self.config.database.clone(),
            retention_policy: self.config.retention_policy.clone(),
        };
        let sink = self
            .connector
            .connect()
            .await
            .map_err(PipelineError::Connect)?;
        let ack = sink.write(&batch).await.map_err(PipelineError::Write)?;

        if self.config.log_received {
            info!(target: "bridge.pipeline", ack = ?ack, "write_acknowledged");
        }
        info!(
            target: "bridge.pipeline",
            client_name = %event.client.name,
            database = %batch.database,
            points = batch.len(),
            skipped,
            "batch_written"
        );

        Ok(PipelineReport {
            client_name: event.client.name,
            points_written: ack.points,
            lines_skipped: skipped,
            ack,
        })
    }
}

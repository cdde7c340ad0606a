//! 采集链路装配模块
//!
//! 将监听源、流水线与写入端组装在一起。配置与写入端连接器在构造时注入，
//! 每个连接的处理器之间不共享可变状态。

use async_trait::async_trait;
use bridge_config::BridgeConfig;
use bridge_ingest::{IngestError, PayloadHandler, ReceivedPayload, StreamSource};
use bridge_pipeline::{Pipeline, PipelineConfig};
use bridge_sink::{InfluxDbConfig, InfluxDbConnector, SinkConnector};
use std::sync::Arc;
use tracing::debug;

/// 连接处理器
///
/// 实现 `PayloadHandler`，把每个连接的完整报文交给流水线。
pub struct BridgeHandler {
    pipeline: Pipeline,
}

impl BridgeHandler {
    pub fn new(connector: Arc<dyn SinkConnector>, config: &BridgeConfig) -> Self {
        Self {
            pipeline: Pipeline::new(connector, pipeline_config(config)),
        }
    }
}

#[async_trait]
impl PayloadHandler for BridgeHandler {
    async fn handle(&self, payload: ReceivedPayload) -> Result<(), IngestError> {
        match self.pipeline.process(&payload.bytes).await {
            Ok(report) => {
                debug!(
                    target: "bridge.server",
                    client_name = %report.client_name,
                    points = report.points_written,
                    skipped = report.lines_skipped,
                    "connection_processed"
                );
                Ok(())
            }
            Err(err) => Err(IngestError::Handler {
                stage: err.stage(),
                message: err.to_string(),
            }),
        }
    }
}

/// 流水线参数：目标库与日志开关。
pub fn pipeline_config(config: &BridgeConfig) -> PipelineConfig {
    PipelineConfig::new(config.influxdb_database.clone(), config.log_received)
}

/// 由配置构造 InfluxDB 连接器。
pub fn influxdb_connector(config: &BridgeConfig) -> InfluxDbConnector {
    InfluxDbConnector::new(InfluxDbConfig {
        url: config.influxdb_url(),
        username: config.influxdb_username.clone(),
        password: config.influxdb_password.clone(),
    })
}

/// 按配置绑定监听源。
pub async fn bind_source(config: &BridgeConfig) -> Result<StreamSource, IngestError> {
    StreamSource::bind(config.listen_conn_type, &config.listen_addr()).await
}

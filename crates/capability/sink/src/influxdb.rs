//! InfluxDB 1.x HTTP 写入实现
//!
//! - 连接：`GET /ping`，非 2xx 视为不可用
//! - 写入：`POST /write?db=<db>&rp=<rp>&precision=ns`，请求体为行协议

use crate::error::SinkError;
use crate::line_protocol::encode_batch;
use crate::traits::{PointSink, SinkConnector, WriteAck};
use async_trait::async_trait;
use domain::Batch;
use tracing::debug;

/// InfluxDB 连接参数。
#[derive(Debug, Clone)]
pub struct InfluxDbConfig {
    /// 形如 `http://127.0.0.1:8086`。
    pub url: String,
    pub username: String,
    pub password: String,
}

impl InfluxDbConfig {
    /// 非空用户名/口令以 `u`/`p` 查询参数携带。
    fn credentials(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.username.is_empty() {
            params.push(("u", self.username.clone()));
        }
        if !self.password.is_empty() {
            params.push(("p", self.password.clone()));
        }
        params
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path)
    }
}

/// 每次连接创建新的 HTTP 客户端并 ping。
#[derive(Debug, Clone)]
pub struct InfluxDbConnector {
    config: InfluxDbConfig,
}

impl InfluxDbConnector {
    pub fn new(config: InfluxDbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InfluxDbConfig {
        &self.config
    }
}

#[async_trait]
impl SinkConnector for InfluxDbConnector {
    async fn connect(&self) -> Result<Box<dyn PointSink>, SinkError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| SinkError::Other(err.to_string()))?;

        let response = client
            .get(self.config.endpoint("ping"))
            .query(&self.config.credentials())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Ping(status.as_u16()));
        }
        debug!(target: "bridge.sink", url = %self.config.url, status = status.as_u16(), "influxdb_ping");

        Ok(Box::new(InfluxDbSink {
            client,
            config: self.config.clone(),
        }))
    }
}

/// 已连通的 InfluxDB 写入端。
pub struct InfluxDbSink {
    client: reqwest::Client,
    config: InfluxDbConfig,
}

#[async_trait]
impl PointSink for InfluxDbSink {
    async fn write(&self, batch: &Batch) -> Result<WriteAck, SinkError> {
        if batch.is_empty() {
            return Ok(WriteAck {
                points: 0,
                status: None,
            });
        }

        let mut query = vec![
            ("db", batch.database.clone()),
            ("rp", batch.retention_policy.clone()),
            ("precision", "ns".to_string()),
        ];
        query.extend(self.config.credentials());

        let response = self
            .client
            .post(self.config.endpoint("write"))
            .query(&query)
            .body(encode_batch(batch))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(WriteAck {
            points: batch.len(),
            status: Some(status.as_u16()),
        })
    }
}

//! 桥接服务入口：加载配置、初始化日志、启动监听。

use bridge_config::BridgeConfig;
use bridge_server::{BridgeHandler, bind_source, influxdb_connector};
use bridge_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    // 初始化结构化日志
    init_tracing();
    // 配置文件 + 环境变量覆盖
    let config = BridgeConfig::from_env()?;
    info!(target: "bridge.server", config = ?config.redacted(), "config_loaded");

    let connector = Arc::new(influxdb_connector(&config));
    let handler = Arc::new(BridgeHandler::new(connector, &config));

    let source = bind_source(&config).await?;
    info!(
        target: "bridge.server",
        protocol = %config.listen_conn_type,
        addr = %source.local_addr(),
        "bridge_started"
    );
    source.run(handler).await?;
    Ok(())
}

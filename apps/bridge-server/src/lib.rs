//! 检查结果指标桥接服务：接收监控事件，转换检查输出中的指标行并写入 InfluxDB。

pub mod bridge;

pub use bridge::{BridgeHandler, bind_source, influxdb_connector, pipeline_config};

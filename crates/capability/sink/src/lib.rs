//! # 时序库写入模块
//!
//! 写入端被建模为能力接口，连接处理器在构造时注入：
//!
//! 1. **接口层** (`traits.rs`)：[`SinkConnector`] 为每个连接建立新的 [`PointSink`]
//! 2. **错误层** (`error.rs`)：统一的 [`SinkError`]
//! 3. **编码层** (`line_protocol.rs`)：点位 → InfluxDB 行协议
//! 4. **实现层**：
//!    - `influxdb.rs`：InfluxDB 1.x HTTP（ping + write）
//!    - `in_memory.rs`：内存实现（用于测试）

mod error;
mod in_memory;
mod influxdb;
pub mod line_protocol;
mod traits;

pub use error::SinkError;
pub use in_memory::{InMemoryConnector, InMemorySink};
pub use influxdb::{InfluxDbConfig, InfluxDbConnector, InfluxDbSink};
pub use traits::{PointSink, SinkConnector, WriteAck};

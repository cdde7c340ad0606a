//! 领域模型：事件、解析结果、时序点位与写入批次。
//!
//! 所有类型都只存活于单个连接的处理周期内。

pub mod data;
pub mod event;

pub use data::{Batch, FieldValue, ParsedMetric, Point, DEFAULT_RETENTION_POLICY};
pub use event::{CheckInfo, ClientInfo, Event};

//! 日志初始化与连接级追踪标识。
//!
//! 连接之间不共享任何计数器，可观测性只通过日志输出。

use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt};

/// 初始化 tracing（默认 info，可由 RUST_LOG 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 connection_id。
pub fn new_connection_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 单个连接的处理 span。
pub fn connection_span(connection_id: &str, peer: &str) -> Span {
    tracing::info_span!("connection", connection_id = %connection_id, peer = %peer)
}

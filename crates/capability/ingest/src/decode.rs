//! 事件报文解码。

use domain::Event;

/// 事件解码错误：报文不是合法 JSON 或缺少必需字段。
#[derive(Debug, thiserror::Error)]
#[error("error unmarshalling event: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// 将完整报文解码为 [`Event`]。
///
/// `client.name`、`client.address`、`check.output` 均为必需字段，其余字段忽略。
pub fn decode_event(payload: &[u8]) -> Result<Event, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

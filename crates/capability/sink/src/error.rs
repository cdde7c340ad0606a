//! 写入端错误类型

/// 时序库写入错误：连接失败、ping 失败或写入被拒绝。
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink unreachable: {0}")]
    Unreachable(String),
    #[error("ping failed with status {0}")]
    Ping(u16),
    #[error("write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("sink error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

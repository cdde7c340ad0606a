use serde::{Deserialize, Serialize};

/// 上报客户端身份。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub address: String,
}

/// 检查结果，仅关心 output 文本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInfo {
    pub output: String,
}

/// 一次连接携带的监控事件。
///
/// 报文中的其余字段在解码时被忽略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub client: ClientInfo,
    pub check: CheckInfo,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            client: ClientInfo {
                name: name.into(),
                address: address.into(),
            },
            check: CheckInfo {
                output: output.into(),
            },
        }
    }
}

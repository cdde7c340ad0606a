//! 桥接服务运行配置加载。
//!
//! 先读取 JSON 配置文件（缺省字段取默认值），再用 `BRIDGE_*` 环境变量逐项覆盖。

use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 配置文件路径的环境变量。
pub const CONFIG_PATH_ENV: &str = "BRIDGE_CONFIG";
/// 默认配置文件路径。
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(String, String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 监听协议。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenProtocol {
    Tcp,
    Tcp4,
    Tcp6,
    /// `listen_host` 作为套接字路径，端口忽略。
    Unix,
}

impl FromStr for ListenProtocol {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "tcp4" => Ok(Self::Tcp4),
            "tcp6" => Ok(Self::Tcp6),
            "unix" => Ok(Self::Unix),
            _ => Err(ConfigError::Invalid(
                "listen_conn_type".to_string(),
                value.to_string(),
            )),
        }
    }
}

impl fmt::Display for ListenProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tcp => "tcp",
            Self::Tcp4 => "tcp4",
            Self::Tcp6 => "tcp6",
            Self::Unix => "unix",
        };
        f.write_str(name)
    }
}

/// 桥接服务运行配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub listen_host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub listen_port: u16,
    pub listen_conn_type: ListenProtocol,
    pub influxdb_host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub influxdb_port: u16,
    pub influxdb_username: String,
    pub influxdb_password: String,
    pub influxdb_database: String,
    /// 打印原始报文与写入回执。
    pub log_received: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: 3333,
            listen_conn_type: ListenProtocol::Tcp,
            influxdb_host: "127.0.0.1".to_string(),
            influxdb_port: 8086,
            influxdb_username: String::new(),
            influxdb_password: String::new(),
            influxdb_database: "sensu".to_string(),
            log_received: false,
        }
    }
}

impl BridgeConfig {
    /// 从 `BRIDGE_CONFIG` 指向的文件（默认 `config.json`）加载，并应用环境变量覆盖。
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// 读取 JSON 配置文件；文件缺失视为错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(path.display().to_string(), err.to_string()))?;
        Self::from_json(&raw)
    }

    /// 解析 JSON 文本，未给出的字段取默认值。
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// 按 `BRIDGE_<FIELD>` 逐项覆盖。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = read("BRIDGE_LISTEN_HOST") {
            self.listen_host = value;
        }
        if let Some(value) = read("BRIDGE_LISTEN_PORT") {
            self.listen_port = parse_u16("BRIDGE_LISTEN_PORT", value)?;
        }
        if let Some(value) = read("BRIDGE_LISTEN_CONN_TYPE") {
            self.listen_conn_type = value.parse()?;
        }
        if let Some(value) = read("BRIDGE_INFLUXDB_HOST") {
            self.influxdb_host = value;
        }
        if let Some(value) = read("BRIDGE_INFLUXDB_PORT") {
            self.influxdb_port = parse_u16("BRIDGE_INFLUXDB_PORT", value)?;
        }
        if let Some(value) = read("BRIDGE_INFLUXDB_USERNAME") {
            self.influxdb_username = value;
        }
        if let Some(value) = read("BRIDGE_INFLUXDB_PASSWORD") {
            self.influxdb_password = value;
        }
        if let Some(value) = read("BRIDGE_INFLUXDB_DATABASE") {
            self.influxdb_database = value;
        }
        if let Some(value) = read("BRIDGE_LOG_RECEIVED") {
            self.log_received = matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on");
        }
        Ok(())
    }

    /// InfluxDB HTTP 基础地址。
    pub fn influxdb_url(&self) -> String {
        format!("http://{}:{}", self.influxdb_host, self.influxdb_port)
    }

    /// 监听地址（unix 为套接字路径）。
    pub fn listen_addr(&self) -> String {
        match self.listen_conn_type {
            ListenProtocol::Unix => self.listen_host.clone(),
            _ if self.listen_host.contains(':') && !self.listen_host.starts_with('[') => {
                format!("[{}]:{}", self.listen_host, self.listen_port)
            }
            _ => format!("{}:{}", self.listen_host, self.listen_port),
        }
    }

    /// 隐去口令后的副本，用于启动日志。
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.influxdb_password.is_empty() {
            config.influxdb_password = "******".to_string();
        }
        config
    }
}

fn parse_u16(key: &str, value: String) -> Result<u16, ConfigError> {
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 端口既可写作数字也可写作字符串（如 `"3333"`）。
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse::<u16>()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {text}"))),
    }
}

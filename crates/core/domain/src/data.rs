use std::collections::BTreeMap;
use std::time::SystemTime;

/// 写入时使用的保留策略。
pub const DEFAULT_RETENTION_POLICY: &str = "default";

/// 单行指标的解析结果。
///
/// `key` 非空且不含 `.`；`value` 为有限数；`timestamp_raw` 只做校验，
/// 不参与点位时间。
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMetric {
    pub key: String,
    pub value: f64,
    pub timestamp_raw: i64,
}

/// 点位字段值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// 32 位精度浮点（解析为 f64 后收窄存储）。
    Float32(f32),
}

impl FieldValue {
    /// 以 f64 形式读取，结果与存储的 32 位值完全一致。
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Float32(v) => f64::from(*v),
        }
    }
}

/// 时序点位。
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: SystemTime,
}

impl Point {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).copied()
    }
}

/// 一次写入调用提交的点位批次。
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub points: Vec<Point>,
    pub database: String,
    pub retention_policy: String,
}

impl Batch {
    /// 使用默认保留策略构造批次。
    pub fn new(points: Vec<Point>, database: impl Into<String>) -> Self {
        Self {
            points,
            database: database.into(),
            retention_policy: DEFAULT_RETENTION_POLICY.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

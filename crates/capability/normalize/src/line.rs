//! 检查输出中单行指标的解析。
//!
//! 行格式：`<namespace>.<metric> <value> <timestamp>`，以单个空格分隔。

use domain::ParsedMetric;

/// 单行解析错误；出错的行被跳过，不影响同批其他行。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("wrong number of fields: expected 3, got {count}")]
    FieldCount { count: usize },
    #[error("metric path has no namespace: {path}")]
    MissingNamespace { path: String },
    #[error("metric key is empty: {path}")]
    EmptyKey { path: String },
    #[error("error parsing value ({raw}): {reason}")]
    Value { raw: String, reason: String },
    #[error("value is not finite: {raw}")]
    NonFiniteValue { raw: String },
    #[error("value out of 32-bit range: {raw}")]
    OutOfRange { raw: String },
    #[error("error parsing time ({raw}): {reason}")]
    Timestamp { raw: String, reason: String },
}

/// 解析一行指标。
///
/// `path` 在第一个 `.` 处切分，丢弃命名空间，余下部分中的 `.` 全部替换为 `_`。
pub fn parse_line(raw: &str) -> Result<ParsedMetric, ParseError> {
    let fields: Vec<&str> = raw.trim().split(' ').collect();
    let [path, value, timestamp] = fields.as_slice() else {
        return Err(ParseError::FieldCount {
            count: fields.len(),
        });
    };

    let key = normalize_key(path)?;

    let value = value.parse::<f64>().map_err(|err| ParseError::Value {
        raw: value.to_string(),
        reason: err.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParseError::NonFiniteValue {
            raw: fields[1].to_string(),
        });
    }
    // 写入端按 f32 保存，超出范围会变成 inf
    if !(value as f32).is_finite() {
        return Err(ParseError::OutOfRange {
            raw: fields[1].to_string(),
        });
    }

    let timestamp_raw = timestamp
        .parse::<i64>()
        .map_err(|err| ParseError::Timestamp {
            raw: timestamp.to_string(),
            reason: err.to_string(),
        })?;

    Ok(ParsedMetric {
        key,
        value,
        timestamp_raw,
    })
}

fn normalize_key(path: &str) -> Result<String, ParseError> {
    let Some((_namespace, key_raw)) = path.split_once('.') else {
        return Err(ParseError::MissingNamespace {
            path: path.to_string(),
        });
    };
    if key_raw.is_empty() {
        return Err(ParseError::EmptyKey {
            path: path.to_string(),
        });
    }
    Ok(key_raw.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_drops_namespace_only() {
        assert_eq!(normalize_key("a.b").unwrap(), "b");
        assert_eq!(normalize_key("a.b.c.d").unwrap(), "b_c_d");
        assert_eq!(normalize_key(".b").unwrap(), "b");
        assert_eq!(normalize_key("a..b").unwrap(), "_b");
    }

    #[test]
    fn normalize_key_rejects_missing_or_empty_key() {
        assert!(matches!(
            normalize_key("plain"),
            Err(ParseError::MissingNamespace { .. })
        ));
        assert!(matches!(
            normalize_key("a."),
            Err(ParseError::EmptyKey { .. })
        ));
    }
}

//! InfluxDB 行协议编码。
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1 timestamp_ns
//! ```

use domain::{Batch, FieldValue, Point};
use std::time::UNIX_EPOCH;

/// 编码整个批次，每个点位一行。
pub fn encode_batch(batch: &Batch) -> String {
    batch
        .points
        .iter()
        .map(encode_point)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 编码单个点位。
///
/// 标签按键排序，值为空的标签省略；时间戳为纳秒。
pub fn encode_point(point: &Point) -> String {
    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    let fields = point
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", escape_key(key), format_field(value)))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(&fields);

    let timestamp_ns = point
        .time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    line.push(' ');
    line.push_str(&timestamp_ns.to_string());
    line
}

/// 32 位值按 f64 输出，写入的数值即存储的数值。
fn format_field(value: &FieldValue) -> String {
    value.as_f64().to_string()
}

/// 测量名：换行替换为空格，再转义逗号与空格。反斜杠原样保留。
fn escape_measurement(s: &str) -> String {
    flatten_line_breaks(s)
        .replace(',', "\\,")
        .replace(' ', "\\ ")
}

/// 标签键、标签值与字段键：换行替换为空格，再转义逗号、等号与空格。
fn escape_key(s: &str) -> String {
    flatten_line_breaks(s)
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// 行协议无法转义换行，原样写出会把一条记录拆成两行。
fn flatten_line_breaks(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

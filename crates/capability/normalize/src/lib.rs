//! 检查输出 → 时序点位的规范化。
//!
//! [`parse_line`] 负责单行校验，[`build_points`] 把事件中的所有行折叠成点位，
//! 跳过无法解析的行并记录日志。

mod line;

pub use line::{ParseError, parse_line};

use domain::{Event, FieldValue, ParsedMetric, Point};
use std::collections::BTreeMap;
use std::time::SystemTime;
use tracing::{debug, warn};

/// 客户端名称标签。
pub const TAG_CLIENT_NAME: &str = "client_name";
/// 客户端地址标签。
pub const TAG_CLIENT_ADDRESS: &str = "client_address";
/// 点位值字段。
pub const FIELD_VALUE: &str = "value";

/// 点位构建结果。
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// 按输入行顺序排列的点位。
    pub points: Vec<Point>,
    /// 被跳过的非空行数。
    pub skipped: usize,
}

/// 构建事件中的全部点位，顺序与输入行一致。
pub fn build_points(event: &Event) -> Vec<Point> {
    build_points_with_report(event).points
}

/// 同 [`build_points`]，并返回被跳过的行数。
pub fn build_points_with_report(event: &Event) -> BuildReport {
    let mut report = BuildReport::default();

    for raw in event.check.output.trim().split('\n') {
        let line = raw.trim();
        if line.is_empty() {
            debug!(target: "bridge.normalize", "blank_line_skipped");
            continue;
        }
        match parse_line(line) {
            Ok(metric) => report.points.push(build_point(event, metric)),
            Err(err) => {
                report.skipped += 1;
                warn!(
                    target: "bridge.normalize",
                    client_name = %event.client.name,
                    line = %line,
                    error = %err,
                    "line_skipped"
                );
            }
        }
    }

    report
}

/// 由解析结果构造点位；值收窄为 32 位，时间取构造时刻。
fn build_point(event: &Event, metric: ParsedMetric) -> Point {
    let narrowed = metric.value as f32;
    debug!(
        target: "bridge.normalize",
        key = %metric.key,
        value = metric.value,
        stored = narrowed,
        timestamp_raw = metric.timestamp_raw,
        "metric_parsed"
    );

    let tags = BTreeMap::from([
        (TAG_CLIENT_NAME.to_string(), event.client.name.clone()),
        (TAG_CLIENT_ADDRESS.to_string(), event.client.address.clone()),
    ]);
    let fields = BTreeMap::from([(FIELD_VALUE.to_string(), FieldValue::Float32(narrowed))]);

    Point {
        measurement: metric.key,
        tags,
        fields,
        time: SystemTime::now(),
    }
}

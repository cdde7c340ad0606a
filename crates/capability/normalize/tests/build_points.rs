use bridge_normalize::{
    FIELD_VALUE, TAG_CLIENT_ADDRESS, TAG_CLIENT_NAME, build_points, build_points_with_report,
};
use domain::{Event, FieldValue};
use std::time::{Duration, SystemTime};

fn event(output: &str) -> Event {
    Event::new("web-1", "10.0.0.5", output)
}

#[test]
fn point_is_tagged_with_client_identity() {
    let points = build_points(&event("a.b 12.5 1700000000"));
    assert_eq!(points.len(), 1);

    let point = &points[0];
    assert_eq!(point.measurement, "b");
    assert_eq!(point.tag(TAG_CLIENT_NAME), Some("web-1"));
    assert_eq!(point.tag(TAG_CLIENT_ADDRESS), Some("10.0.0.5"));
    assert_eq!(point.field(FIELD_VALUE), Some(FieldValue::Float32(12.5)));
}

#[test]
fn malformed_lines_do_not_suppress_siblings() {
    let output = "a.first 1 1\n\
                  a.b 1\n\
                  a.b NaNtext 1\n\
                  nonamespace 1 1\n\
                  a.second 2 2\n\
                  a.b 3 notatime";
    let report = build_points_with_report(&event(output));
    let keys: Vec<&str> = report
        .points
        .iter()
        .map(|point| point.measurement.as_str())
        .collect();
    assert_eq!(keys, vec!["first", "second"]);
    assert_eq!(report.skipped, 4);
}

#[test]
fn empty_or_whitespace_output_yields_no_points() {
    for output in ["", "   ", "\n\n", " \r\n \t "] {
        let report = build_points_with_report(&event(output));
        assert!(report.points.is_empty());
        assert_eq!(report.skipped, 0);
    }
}

#[test]
fn points_keep_input_order_and_count() {
    let lines: Vec<String> = (0..25)
        .map(|i| format!("host.metric.n{i} {i}.5 1700000000"))
        .collect();
    let points = build_points(&event(&lines.join("\n")));

    assert_eq!(points.len(), 25);
    for (i, point) in points.iter().enumerate() {
        assert_eq!(point.measurement, format!("metric_n{i}"));
        assert_eq!(point.tag(TAG_CLIENT_NAME), Some("web-1"));
        assert_eq!(point.tag(TAG_CLIENT_ADDRESS), Some("10.0.0.5"));
    }
}

#[test]
fn value_is_narrowed_to_32_bits() {
    let points = build_points(&event("a.b 0.1 1"));
    let value = points[0].field(FIELD_VALUE).expect("value");
    assert_eq!(value, FieldValue::Float32(0.1_f32));
    assert_eq!(value.as_f64(), f64::from(0.1_f32));
}

#[test]
fn point_time_is_receipt_time_not_line_timestamp() {
    let before = SystemTime::now();
    let points = build_points(&event("a.b 1 1000"));
    let after = SystemTime::now();

    let time = points[0].time;
    assert!(time >= before && time <= after);
    assert!(time > SystemTime::UNIX_EPOCH + Duration::from_secs(1000));
}

#[test]
fn crlf_line_endings_are_tolerated() {
    let points = build_points(&event("a.x 1 1\r\na.y 2 2\r\n"));
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].measurement, "y");
}

#[test]
fn out_of_range_value_skips_only_its_line() {
    let report = build_points_with_report(&event("a.big 1e39 1\na.ok 2 2"));
    assert_eq!(report.skipped, 1);
    assert_eq!(report.points.len(), 1);
    assert_eq!(report.points[0].measurement, "ok");
    assert_eq!(
        report.points[0].field(FIELD_VALUE),
        Some(FieldValue::Float32(2.0))
    );
}

use serde_json::json;
use trackplot::{axis_extent, Axis, AxisOptions, Record};

fn records(values: &[f64]) -> Vec<Record> {
    values
        .iter()
        .map(|v| json!({ "x": v }).as_object().unwrap().clone())
        .collect()
}

fn x_options() -> AxisOptions {
    AxisOptions {
        field: Some("x".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_plain_min_max() {
    let extent = axis_extent(&records(&[1.0, 2.0, 3.0, 4.0]), &x_options());
    assert_eq!(extent, Some((1.0, 4.0)));
}

#[test]
fn test_lower_buffer_expands_min() {
    let opts = AxisOptions {
        lower_buffer: Some(0.05),
        ..x_options()
    };
    let (min, max) = axis_extent(&records(&[1.0, 2.0, 3.0, 4.0]), &opts).unwrap();
    // span 3, buffer 0.05 -> min drops by 0.15
    assert!((min - 0.85).abs() < 1e-12);
    assert_eq!(max, 4.0);
}

#[test]
fn test_min_extent_widens_but_never_narrows() {
    let opts = AxisOptions {
        min_extent: Some((0.0, 3.0)),
        ..x_options()
    };
    let extent = axis_extent(&records(&[1.0, 2.0, 3.0, 4.0]), &opts);
    assert_eq!(extent, Some((0.0, 4.0)));
}

#[test]
fn test_floor_and_ceiling_win_over_expansion() {
    let opts = AxisOptions {
        lower_buffer: Some(0.5),
        upper_buffer: Some(0.5),
        min_extent: Some((0.0, 10.0)),
        floor: Some(0.0),
        ceiling: Some(5.0),
        ..x_options()
    };
    // buffers push to (-0.5, 5.5), min_extent widens to (-0.5, 10),
    // the hard clamp has the last word
    let extent = axis_extent(&records(&[1.0, 2.0, 3.0, 4.0]), &opts);
    assert_eq!(extent, Some((0.0, 5.0)));
}

#[test]
fn test_empty_records_yield_nothing() {
    assert_eq!(axis_extent(&[], &x_options()), None);
}

#[test]
fn test_empty_records_pass_min_extent_verbatim() {
    let opts = AxisOptions {
        min_extent: Some((2.0, 8.0)),
        // floor/ceiling are skipped on the verbatim path
        floor: Some(3.0),
        ceiling: Some(7.0),
        ..x_options()
    };
    assert_eq!(axis_extent(&[], &opts), Some((2.0, 8.0)));
}

#[test]
fn test_non_numeric_values_are_discarded() {
    let mixed: Vec<Record> = vec![
        json!({ "x": "not a number" }).as_object().unwrap().clone(),
        json!({ "x": null }).as_object().unwrap().clone(),
        json!({ "x": 3.0 }).as_object().unwrap().clone(),
    ];
    assert_eq!(axis_extent(&mixed, &x_options()), Some((3.0, 3.0)));
}

#[test]
fn test_single_value_buffers_from_its_magnitude() {
    let opts = AxisOptions {
        lower_buffer: Some(0.1),
        upper_buffer: Some(0.1),
        ..x_options()
    };
    // zero span: the value's own magnitude stands in for the span
    let extent = axis_extent(&records(&[10.0]), &opts);
    assert_eq!(extent, Some((9.0, 11.0)));
}

#[test]
fn test_single_zero_value_uses_epsilon_span() {
    let opts = AxisOptions {
        lower_buffer: Some(0.5),
        upper_buffer: Some(0.5),
        ..x_options()
    };
    let (min, max) = axis_extent(&records(&[0.0]), &opts).unwrap();
    // the epsilon fallback keeps the buffer non-degenerate without
    // blowing up the extent
    assert!(min < 0.0 && min > -1e-9);
    assert!(max > 0.0 && max < 1e-9);
}

#[test]
fn test_missing_field_yields_nothing() {
    let opts = AxisOptions {
        field: Some("absent".to_string()),
        ..Default::default()
    };
    assert_eq!(axis_extent(&records(&[1.0, 2.0]), &opts), None);
}

#[test]
fn test_axis_names_are_a_closed_set() {
    assert_eq!(Axis::from_name("x").unwrap(), Axis::X);
    assert_eq!(Axis::from_name("y1").unwrap(), Axis::Y1);
    assert_eq!(Axis::from_name("y2").unwrap(), Axis::Y2);
    assert!(Axis::from_name("y3").is_err());
    assert!(Axis::from_name("").is_err());
}

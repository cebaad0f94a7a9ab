use trackplot::ticks::TickOverrides;
use trackplot::{format_position, pretty_ticks, ClipMode, Tick};

#[test]
fn test_unclipped_ticks_cover_the_range() {
    let ticks = pretty_ticks((1.0, 4.0), ClipMode::Neither, 5);
    assert_eq!(ticks, vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
    assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(*ticks.first().unwrap() <= 1.0);
    assert!(*ticks.last().unwrap() >= 4.0);
}

#[test]
fn test_clip_both_stays_inside_the_range() {
    let ticks = pretty_ticks((0.7, 3.3), ClipMode::Both, 5);
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|&t| t >= 0.7 && t <= 3.3));

    // Unclipped, the same range overshoots on both sides
    let open = pretty_ticks((0.7, 3.3), ClipMode::Neither, 5);
    assert!(*open.first().unwrap() < 0.7);
    assert!(*open.last().unwrap() > 3.3);
}

#[test]
fn test_clip_single_side() {
    let low = pretty_ticks((0.7, 3.3), ClipMode::Low, 5);
    assert!(*low.first().unwrap() >= 0.7);
    assert!(*low.last().unwrap() > 3.3);

    let high = pretty_ticks((0.7, 3.3), ClipMode::High, 5);
    assert!(*high.first().unwrap() < 0.7);
    assert!(*high.last().unwrap() <= 3.3);
}

#[test]
fn test_round_steps_for_decade_range() {
    let ticks = pretty_ticks((0.0, 100.0), ClipMode::Neither, 5);
    assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn test_degenerate_range_terminates() {
    let ticks = pretty_ticks((5.0, 5.0), ClipMode::Neither, 5);
    assert!(!ticks.is_empty());
    assert!(ticks.len() <= 5);
    assert!(ticks.iter().all(|t| t.is_finite()));

    let at_zero = pretty_ticks((0.0, 0.0), ClipMode::Neither, 5);
    assert_eq!(at_zero, vec![0.0]);
}

#[test]
fn test_huge_offsets_do_not_hang() {
    // ulp(1e18) is far larger than the step; the walk must still terminate
    let ticks = pretty_ticks((1e18, 1e18 + 1.0), ClipMode::Neither, 5);
    assert!(!ticks.is_empty());
}

#[test]
fn test_tick_overrides_win_on_conflict() {
    let mut style = serde_json::Map::new();
    style.insert("fill".to_string(), serde_json::json!("red"));
    let tick = Tick {
        position: 3.0,
        label: Some("three".to_string()),
        style,
        transform: None,
    };

    let mut override_style = serde_json::Map::new();
    override_style.insert("fill".to_string(), serde_json::json!("blue"));
    let overrides = TickOverrides {
        label: Some("forced".to_string()),
        style: override_style,
        transform: Some("rotate(45)".to_string()),
    };

    let merged = tick.merged_with(&overrides);
    assert_eq!(merged.position, 3.0);
    assert_eq!(merged.label.as_deref(), Some("forced"));
    assert_eq!(merged.style["fill"], "blue");
    assert_eq!(merged.transform.as_deref(), Some("rotate(45)"));
}

#[test]
fn test_position_formatting() {
    assert_eq!(format_position(10_300_000.0), "10.30 Mb");
    assert_eq!(format_position(2_500.0), "2.50 Kb");
    assert_eq!(format_position(42.0), "42 b");
}

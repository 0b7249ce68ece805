//! Tests for the brush state machine
//!
//! Tests cover:
//! - Initial range construction and recovery from bad bounds
//! - Clamping of arbitrary drag requests
//! - Keyboard and touch input
//! - Configuration validation
//! - Phase transitions (disabled, full range, subrange, resetting)

use crate::common::fixtures::numbered;
use autochart::brush::{
    build_range, filter_by_range, on_change, on_key, reset_range, touch_index,
    validate_brush_config, BrushConfig, BrushConfigError, BrushError, BrushKey, BrushPhase,
    BrushRange, BrushState, TouchPhase,
};
use serde_json::json;

fn declared(start: Option<i64>, end: Option<i64>) -> BrushConfig {
    BrushConfig {
        data_start_index: start,
        data_end_index: end,
        ..Default::default()
    }
}

fn range(start_index: usize, end_index: usize) -> BrushRange {
    BrushRange {
        start_index,
        end_index,
    }
}

// ============================================
// Initial Range Tests
// ============================================

#[test]
fn test_inverted_config_falls_back_to_full_range() {
    let r = build_range(&declared(Some(5), Some(2)), 10).unwrap();
    assert_eq!(r, range(0, 10));
}

#[test]
fn test_defaults_cover_everything() {
    assert_eq!(build_range(&BrushConfig::default(), 7).unwrap(), range(0, 7));
    assert_eq!(build_range(&declared(Some(3), None), 7).unwrap(), range(3, 7));
    assert_eq!(build_range(&declared(None, Some(4)), 7).unwrap(), range(0, 4));
}

#[test]
fn test_end_clamped_to_data_length() {
    assert_eq!(build_range(&declared(Some(2), Some(100)), 5).unwrap(), range(2, 5));
}

#[test]
fn test_start_past_data_falls_back() {
    assert_eq!(build_range(&declared(Some(9), None), 5).unwrap(), range(0, 5));
}

#[test]
fn test_empty_data_is_an_error() {
    assert_eq!(build_range(&BrushConfig::default(), 0), Err(BrushError::EmptyData));
    assert_eq!(on_change(0, 1, 0), Err(BrushError::EmptyData));
    assert_eq!(reset_range(0), Err(BrushError::EmptyData));
}

#[test]
fn test_config_deserializes_camel_case() {
    let config: BrushConfig = serde_json::from_value(json!({
        "dataStartIndex": 1,
        "dataEndIndex": 4,
        "travellerWidth": 8,
        "enabled": false
    }))
    .unwrap();
    assert_eq!(config.data_start_index, Some(1));
    assert_eq!(config.data_end_index, Some(4));
    assert_eq!(config.traveller_width, Some(8.0));
    assert_eq!(config.enabled, Some(false));
}

// ============================================
// Change and Reset Tests
// ============================================

#[test]
fn test_on_change_keeps_valid_range() {
    assert_eq!(on_change(2, 6, 10).unwrap(), range(2, 6));
}

#[test]
fn test_on_change_clamps_out_of_bounds() {
    assert_eq!(on_change(-4, 50, 10).unwrap(), range(0, 10));
    assert_eq!(on_change(12, 20, 10).unwrap(), range(9, 10));
    assert_eq!(on_change(4, 4, 10).unwrap(), range(4, 5));
    assert_eq!(on_change(6, 1, 10).unwrap(), range(6, 7));
}

#[test]
fn test_on_change_invariant_holds_everywhere() {
    for len in 1..8usize {
        for start in -5..12i64 {
            for end in -5..12i64 {
                let r = on_change(start, end, len).unwrap();
                assert!(
                    r.start_index < r.end_index && r.end_index <= len,
                    "({}, {}) over {} rows gave {:?}",
                    start,
                    end,
                    len,
                    r
                );
            }
        }
    }
}

#[test]
fn test_reset_returns_full_range() {
    assert_eq!(reset_range(4).unwrap(), range(0, 4));
}

#[test]
fn test_filter_by_range() {
    let data = numbered(10);
    let visible = filter_by_range(&data, 2, 5);
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[0]["i"], json!(2));
    assert_eq!(visible[2]["i"], json!(4));

    assert_eq!(filter_by_range(&data, -5, 100).len(), 10);
    assert!(filter_by_range(&data, 7, 3).is_empty());
    assert!(filter_by_range(&[], 0, 3).is_empty());
}

// ============================================
// Keyboard Tests
// ============================================

#[test]
fn test_left_and_right_shift_without_resizing() {
    let r = on_key(range(3, 6), BrushKey::Left, 2, 10);
    assert_eq!(r, range(1, 4));

    let r = on_key(r, BrushKey::Left, 5, 10);
    assert_eq!(r, range(0, 3));

    let r = on_key(r, BrushKey::Right, 4, 10);
    assert_eq!(r, range(4, 7));

    let r = on_key(r, BrushKey::Right, 100, 10);
    assert_eq!(r, range(7, 10));
}

#[test]
fn test_up_widens_within_bounds() {
    assert_eq!(on_key(range(3, 6), BrushKey::Up, 1, 10), range(2, 7));
    assert_eq!(on_key(range(1, 9), BrushKey::Up, 5, 10), range(0, 10));
}

#[test]
fn test_down_narrows_but_never_empties() {
    assert_eq!(on_key(range(0, 10), BrushKey::Down, 2, 10), range(2, 8));
    assert_eq!(on_key(range(4, 6), BrushKey::Down, 1, 10), range(4, 6));
    assert_eq!(on_key(range(4, 5), BrushKey::Down, 3, 10), range(4, 5));
}

#[test]
fn test_key_sequence_stays_valid() {
    let keys = [
        BrushKey::Down,
        BrushKey::Right,
        BrushKey::Right,
        BrushKey::Up,
        BrushKey::Left,
        BrushKey::Down,
        BrushKey::Down,
        BrushKey::Right,
        BrushKey::Up,
        BrushKey::Up,
    ];
    let mut r = range(0, 12);
    for key in keys {
        r = on_key(r, key, 3, 12);
        assert!(r.start_index < r.end_index && r.end_index <= 12, "{:?}", r);
    }
}

// ============================================
// Touch Tests
// ============================================

#[test]
fn test_touch_index_proportional() {
    assert_eq!(touch_index(0.0, 300.0, 4), 0);
    assert_eq!(touch_index(150.0, 300.0, 4), 2);
    assert_eq!(touch_index(300.0, 300.0, 4), 3);
    assert_eq!(touch_index(-20.0, 300.0, 4), 0);
    assert_eq!(touch_index(f64::NAN, 300.0, 4), 0);
    assert_eq!(touch_index(10.0, 300.0, 0), 0);
}

#[test]
fn test_touch_start_then_move() {
    let mut state = BrushState::build(&BrushConfig::default(), 11).unwrap();

    let r = state.on_touch(TouchPhase::Start, 40.0, 200.0).unwrap();
    assert_eq!(r, range(2, 11));

    let r = state.on_touch(TouchPhase::Move, 120.0, 200.0).unwrap();
    assert_eq!(r, range(2, 7));
}

#[test]
fn test_touch_move_before_start_stays_valid() {
    let mut state = BrushState::build(&declared(Some(6), None), 11).unwrap();
    let r = state.on_touch(TouchPhase::Move, 0.0, 200.0).unwrap();
    assert_eq!(r, range(6, 7));
}

// ============================================
// Validation Tests
// ============================================

#[test]
fn test_validate_accepts_sensible_config() {
    let data = numbered(10);
    let config = BrushConfig {
        data_start_index: Some(2),
        data_end_index: Some(10),
        height: Some(30.0),
        opacity: Some(0.4),
        ..Default::default()
    };
    assert_eq!(validate_brush_config(&config, &data), Ok(()));
}

#[test]
fn test_validate_rejections() {
    let data = numbered(10);

    assert_eq!(
        validate_brush_config(&BrushConfig::default(), &[]),
        Err(BrushConfigError::EmptyData)
    );
    assert_eq!(
        validate_brush_config(&declared(Some(-1), None), &data),
        Err(BrushConfigError::NegativeStart(-1))
    );
    assert_eq!(
        validate_brush_config(&declared(None, Some(11)), &data),
        Err(BrushConfigError::EndBeyondData { end: 11, len: 10 })
    );
    assert_eq!(
        validate_brush_config(&declared(Some(5), Some(5)), &data),
        Err(BrushConfigError::StartNotBeforeEnd { start: 5, end: 5 })
    );

    let flat = BrushConfig {
        height: Some(0.0),
        ..Default::default()
    };
    assert_eq!(
        validate_brush_config(&flat, &data),
        Err(BrushConfigError::NonPositiveHeight(0.0))
    );

    let faded = BrushConfig {
        opacity: Some(1.2),
        ..Default::default()
    };
    assert_eq!(
        validate_brush_config(&faded, &data),
        Err(BrushConfigError::OpacityOutOfRange(1.2))
    );
}

// ============================================
// Phase Tests
// ============================================

#[test]
fn test_phase_transitions() {
    let mut state = BrushState::build(&BrushConfig::default(), 10).unwrap();
    assert_eq!(state.phase(), BrushPhase::FullRange);

    state.on_change(2, 5).unwrap();
    assert_eq!(state.phase(), BrushPhase::Subrange);

    state.reset().unwrap();
    assert_eq!(state.phase(), BrushPhase::Resetting);
    assert_eq!(state.range(), range(0, 10));

    state.finish_reset();
    assert_eq!(state.phase(), BrushPhase::FullRange);

    state.reset().unwrap();
    state.on_key(BrushKey::Down, 1);
    assert_eq!(state.phase(), BrushPhase::Subrange);
    assert!(!state.is_resetting());
}

#[test]
fn test_disabled_brush() {
    let config = BrushConfig {
        enabled: Some(false),
        ..Default::default()
    };
    let data = numbered(10);
    let mut state = BrushState::build(&config, data.len()).unwrap();
    assert!(!state.is_enabled());
    assert_eq!(state.phase(), BrushPhase::Disabled);

    // input is ignored and every row stays visible
    assert_eq!(state.on_change(2, 4).unwrap(), range(0, 10));
    assert_eq!(state.on_key(BrushKey::Down, 2), range(0, 10));
    assert_eq!(
        state.on_touch(TouchPhase::Start, 50.0, 100.0).unwrap(),
        range(0, 10)
    );
    assert_eq!(state.phase(), BrushPhase::Disabled);
    assert_eq!(state.visible(&data).len(), 10);

    state.set_enabled(true);
    assert_eq!(state.phase(), BrushPhase::FullRange);
    state.on_change(2, 4).unwrap();
    assert_eq!(state.phase(), BrushPhase::Subrange);
    assert_eq!(state.visible(&data).len(), 2);

    // a subrange chosen before disabling is kept but not applied
    state.set_enabled(false);
    assert_eq!(state.range(), range(2, 4));
    assert_eq!(state.visible(&data).len(), 10);
}

#[test]
fn test_visible_rows_follow_state() {
    let data = numbered(8);
    let mut state = BrushState::build(&declared(Some(1), Some(3)), data.len()).unwrap();
    assert_eq!(state.visible(&data).len(), 2);
    assert_eq!(state.data_length(), 8);

    state.on_change(5, 100).unwrap();
    let visible = state.visible(&data);
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[0]["v"], json!(50));
}

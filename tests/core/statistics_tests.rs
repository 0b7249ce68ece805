//! Tests for the statistic engine
//!
//! Tests cover:
//! - Numeric extraction with and without a field name
//! - Mean/median/min/max on the sales fixture
//! - Ordering properties (mean within extrema, median permutation invariance)

use crate::common::fixtures::monthly_sales;
use crate::common::{assert_close, records};
use autochart::statistics::{average, extract, max, median, min, summarize, Statistic};
use serde_json::json;

// ============================================
// Extraction Tests
// ============================================

#[test]
fn test_extract_field_in_row_order() {
    let data = monthly_sales();
    assert_eq!(
        extract(&data, Some("sales")),
        vec![4000.0, 3000.0, 2000.0, 2780.0, 1890.0, 2390.0]
    );
}

#[test]
fn test_extract_coerces_numeric_strings_for_named_field() {
    let data = records(json!([
        {"v": "10"},
        {"v": " 2.5"},
        {"v": "ten"},
        {"v": null},
        {"v": [1]}
    ]));
    assert_eq!(extract(&data, Some("v")), vec![10.0, 2.5]);
}

#[test]
fn test_extract_without_field_ignores_strings() {
    let data = records(json!([
        {"id": "123", "a": 1, "b": "2"},
        {"id": "456", "a": 3, "nested": {"c": 4}}
    ]));
    assert_eq!(extract(&data, None), vec![1.0, 3.0]);
}

#[test]
fn test_extract_missing_field_is_empty() {
    let data = monthly_sales();
    assert!(extract(&data, Some("profit")).is_empty());
    assert!(extract(&data, Some("month")).is_empty());
}

// ============================================
// Scenario Tests
// ============================================

#[test]
fn test_sales_average() {
    let values = extract(&monthly_sales(), Some("sales"));
    assert_close(average(&values), 2676.67, 0.01);
}

#[test]
fn test_sales_median_even_length() {
    // sorted: 1890, 2000, 2390, 2780, 3000, 4000 -> (2390 + 2780) / 2
    let values = extract(&monthly_sales(), Some("sales"));
    assert_close(median(&values), 2585.0, 1e-9);
}

#[test]
fn test_sales_extrema() {
    let values = extract(&monthly_sales(), Some("sales"));
    assert_eq!(max(&values), Some(4000.0));
    assert_eq!(min(&values), Some(1890.0));
}

#[test]
fn test_summary_matches_individual_functions() {
    let values = extract(&monthly_sales(), Some("sales"));
    let summary = summarize(&values).expect("non-empty column");
    assert_eq!(summary.count, 6);
    assert_close(summary.average, average(&values), 1e-9);
    assert_close(summary.median, median(&values), 1e-9);
    assert_close(summary.min, 1890.0, 1e-9);
    assert_close(summary.max, 4000.0, 1e-9);
}

#[test]
fn test_statistic_evaluate_empty_is_none() {
    assert_eq!(Statistic::Average.evaluate(&[]), None);
    assert_eq!(Statistic::Median.evaluate(&[]), None);
    assert_eq!(Statistic::Max.evaluate(&[5.0]), Some(5.0));
}

// ============================================
// Property Tests
// ============================================

fn sample_columns() -> Vec<Vec<f64>> {
    vec![
        vec![1.0],
        vec![-5.0, 5.0],
        vec![3.0, 3.0, 3.0],
        vec![0.1, 0.2, 0.3, 10.0],
        vec![-1e6, 2.5, 7.0, -3.25, 1e6, 0.0],
        vec![4000.0, 3000.0, 2000.0, 2780.0, 1890.0, 2390.0],
    ]
}

#[test]
fn test_average_within_extrema() {
    for values in sample_columns() {
        let avg = average(&values);
        let lo = min(&values).unwrap();
        let hi = max(&values).unwrap();
        assert!(
            lo - 1e-9 <= avg && avg <= hi + 1e-9,
            "average {} outside [{}, {}] for {:?}",
            avg,
            lo,
            hi,
            values
        );
    }
}

#[test]
fn test_median_permutation_invariant() {
    for values in sample_columns() {
        let expected = median(&values);

        let mut reversed = values.clone();
        reversed.reverse();
        assert_eq!(median(&reversed), expected);

        for shift in 0..values.len() {
            let mut rotated = values.clone();
            rotated.rotate_left(shift);
            assert_eq!(median(&rotated), expected, "rotation {} of {:?}", shift, values);
        }
    }
}

#[test]
fn test_empty_defaults() {
    assert_eq!(average(&[]), 0.0);
    assert_eq!(median(&[]), 0.0);
}

//! Core module tests
//!
//! Tests for:
//! - Statistic engine
//! - Reference value resolution and validation
//! - Chart-type inference
//! - Configuration normalization
//! - Cross-chart sync
//! - Brush state machine
//! - Settings persistence

pub mod brush_tests;
pub mod settings_tests;
pub mod statistics_tests;

// src/tests/config_tests.rs - Configuration defaults and validation

use crate::config::{
    Config, DEFAULT_MAX_ACCUMULATOR_OVERFLOW, DEFAULT_MAX_DELTA, DEFAULT_MAX_SUBSTEPS, STEP_120HZ,
    STEP_240HZ, STEP_60HZ,
};
use crate::error::ConfigError;
use super::test_utils::{init_logger, ms};
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.step, Duration::from_nanos(16_666_667));
    assert_eq!(config.time_scale, 1.0);
    assert_eq!(config.safety_max_delta, ms(250));
    assert_eq!(config.safety_max_substeps, 8);
    assert_eq!(config.safety_max_accumulator_overflow, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_rate_presets() {
    assert_eq!(STEP_60HZ.as_nanos(), 16_666_667);
    assert_eq!(STEP_120HZ.as_nanos(), 8_333_333);
    assert_eq!(STEP_240HZ.as_nanos(), 4_166_667);
    assert_eq!(DEFAULT_MAX_DELTA, ms(250));
    assert_eq!(DEFAULT_MAX_SUBSTEPS, 8);
    assert_eq!(DEFAULT_MAX_ACCUMULATOR_OVERFLOW, 3);
}

#[test]
fn test_with_rate() {
    let config = Config::with_rate(120.0).unwrap();
    assert_eq!(config.step, STEP_120HZ);
    assert!((config.rate() - 120.0).abs() < 1e-3);

    let config = Config::with_rate(100.0).unwrap();
    assert_eq!(config.step, ms(10));
    assert_eq!(config.safety_max_substeps, DEFAULT_MAX_SUBSTEPS);
}

#[test]
fn test_with_rate_rejects_invalid() {
    assert_eq!(Config::with_rate(0.0), Err(ConfigError::InvalidRate(0.0)));
    assert_eq!(Config::with_rate(-30.0), Err(ConfigError::InvalidRate(-30.0)));
    assert!(Config::with_rate(f64::NAN).is_err());
    assert!(Config::with_rate(f64::INFINITY).is_err());
    // Step would truncate below one nanosecond
    assert!(Config::with_rate(2.0e9).is_err());
}

#[test]
fn test_builder_setters() {
    let config = Config::default()
        .with_step(ms(10))
        .with_time_scale(0.5)
        .with_max_delta(ms(100))
        .with_max_substeps(2)
        .with_max_accumulator_overflow(5);
    assert_eq!(config.step, ms(10));
    assert_eq!(config.time_scale, 0.5);
    assert_eq!(config.safety_max_delta, ms(100));
    assert_eq!(config.safety_max_substeps, 2);
    assert_eq!(config.safety_max_accumulator_overflow, 5);
}

#[test]
fn test_validate_reports_invalid_fields() {
    assert_eq!(
        Config::default().with_step(Duration::ZERO).validate(),
        Err(ConfigError::InvalidStep)
    );
    assert_eq!(
        Config::default().with_time_scale(-1.0).validate(),
        Err(ConfigError::InvalidTimeScale(-1.0))
    );
    assert!(matches!(
        Config::default().with_time_scale(f64::NAN).validate(),
        Err(ConfigError::InvalidTimeScale(_))
    ));
    assert_eq!(
        Config::default().with_max_delta(Duration::ZERO).validate(),
        Err(ConfigError::InvalidMaxDelta)
    );
    assert_eq!(
        Config::default().with_max_substeps(0).validate(),
        Err(ConfigError::InvalidMaxSubsteps)
    );
    assert_eq!(
        Config::default().with_max_accumulator_overflow(0).validate(),
        Err(ConfigError::InvalidAccumulatorOverflow)
    );
}

#[test]
fn test_sanitized_repairs_every_field() {
    init_logger();
    let config = Config {
        step: Duration::ZERO,
        time_scale: -4.0,
        safety_max_delta: Duration::ZERO,
        safety_max_substeps: 0,
        safety_max_accumulator_overflow: 0,
    }
    .sanitized();

    assert_eq!(config.step, STEP_60HZ);
    assert_eq!(config.time_scale, 0.0);
    assert_eq!(config.safety_max_delta, DEFAULT_MAX_DELTA);
    assert_eq!(config.safety_max_substeps, 1);
    assert_eq!(config.safety_max_accumulator_overflow, 1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_sanitized_keeps_valid_config() {
    let config = Config::default().with_step(ms(5)).with_time_scale(2.0);
    assert_eq!(config.clone().sanitized(), config);
}

#[test]
fn test_error_messages() {
    assert_eq!(ConfigError::InvalidStep.to_string(), "step must be greater than zero");
    assert_eq!(ConfigError::InvalidRate(-1.0).to_string(), "invalid update rate: -1 Hz");
}

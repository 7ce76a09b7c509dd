// config.rs - Stepping configuration constants and structures
use std::time::Duration;
use log::warn;
use crate::error::ConfigError;

// Common fixed rates
pub const STEP_60HZ: Duration = Duration::from_nanos(16_666_667); // ~16.67ms
pub const STEP_120HZ: Duration = Duration::from_nanos(8_333_333); // ~8.33ms
pub const STEP_240HZ: Duration = Duration::from_nanos(4_166_667); // ~4.17ms

pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(250);
pub const DEFAULT_MAX_SUBSTEPS: u32 = 8;
pub const DEFAULT_MAX_ACCUMULATOR_OVERFLOW: u32 = 3;
pub const DEFAULT_TIME_SCALE: f64 = 1.0;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Duration of one fixed update
    pub step: Duration,
    // Multiplier on incoming elapsed time; 0.0 freezes the simulation
    pub time_scale: f64,

    // Safety
    pub safety_max_delta: Duration,
    pub safety_max_substeps: u32,
    pub safety_max_accumulator_overflow: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step: STEP_60HZ,
            time_scale: DEFAULT_TIME_SCALE,

            safety_max_delta: DEFAULT_MAX_DELTA,
            safety_max_substeps: DEFAULT_MAX_SUBSTEPS,
            safety_max_accumulator_overflow: DEFAULT_MAX_ACCUMULATOR_OVERFLOW,
        }
    }
}

impl Config {
    /// Default configuration stepping at `hz` updates per second.
    pub fn with_rate(hz: f64) -> Result<Self, ConfigError> {
        let step = step_from_rate(hz).ok_or(ConfigError::InvalidRate(hz))?;
        Ok(Self { step, ..Self::default() })
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.safety_max_delta = max_delta;
        self
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.safety_max_substeps = max_substeps;
        self
    }

    pub fn with_max_accumulator_overflow(mut self, overflow: u32) -> Self {
        self.safety_max_accumulator_overflow = overflow;
        self
    }

    /// Updates per second implied by `step`.
    pub fn rate(&self) -> f64 {
        rate_from_step(self.step)
    }

    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step.is_zero() {
            return Err(ConfigError::InvalidStep);
        }
        if !(self.time_scale >= 0.0) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if self.safety_max_delta.is_zero() {
            return Err(ConfigError::InvalidMaxDelta);
        }
        if self.safety_max_substeps == 0 {
            return Err(ConfigError::InvalidMaxSubsteps);
        }
        if self.safety_max_accumulator_overflow == 0 {
            return Err(ConfigError::InvalidAccumulatorOverflow);
        }
        Ok(())
    }

    /// Replaces invalid fields so the result always passes `validate`.
    ///
    /// Zero durations fall back to their defaults, a negative or NaN time
    /// scale becomes 0.0 and zero counts become 1.
    pub fn sanitized(mut self) -> Self {
        if self.step.is_zero() {
            warn!("Config step is zero, using default {:?}", STEP_60HZ);
            self.step = STEP_60HZ;
        }
        if !(self.time_scale >= 0.0) {
            warn!("Config time scale {} is invalid, clamping to 0", self.time_scale);
            self.time_scale = 0.0;
        }
        if self.safety_max_delta.is_zero() {
            warn!("Config max delta is zero, using default {:?}", DEFAULT_MAX_DELTA);
            self.safety_max_delta = DEFAULT_MAX_DELTA;
        }
        if self.safety_max_substeps == 0 {
            warn!("Config max substeps is zero, clamping to 1");
            self.safety_max_substeps = 1;
        }
        if self.safety_max_accumulator_overflow == 0 {
            warn!("Config max accumulator overflow is zero, clamping to 1");
            self.safety_max_accumulator_overflow = 1;
        }
        self
    }
}

// Step duration for a rate in Hz, truncated to whole nanoseconds
pub(crate) fn step_from_rate(hz: f64) -> Option<Duration> {
    if !(hz > 0.0) || !hz.is_finite() {
        return None;
    }
    let nanos = (NANOS_PER_SEC / hz).trunc();
    if nanos < 1.0 || nanos >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}

pub(crate) fn rate_from_step(step: Duration) -> f64 {
    1.0 / step.as_secs_f64()
}

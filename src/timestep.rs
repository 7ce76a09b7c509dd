use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use log::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{rate_from_step, step_from_rate, Config};
use crate::error::StepError;
#[cfg(feature = "metrics")]
use crate::metrics::SchedulerMetrics;

type StepFn = Box<dyn FnMut(Duration) -> Result<(), StepError>>;
type ErrorFn = Box<dyn FnMut()>;

/// Return type of a step callback.
///
/// Implemented for `()` (a step that cannot fail) and for `Result<(), E>`
/// where `E` converts into [`StepError`].
pub trait StepResult {
    fn into_step_result(self) -> Result<(), StepError>;
}

impl StepResult for () {
    #[inline]
    fn into_step_result(self) -> Result<(), StepError> {
        Ok(())
    }
}

impl<E: Into<StepError>> StepResult for Result<(), E> {
    #[inline]
    fn into_step_result(self) -> Result<(), StepError> {
        self.map_err(Into::into)
    }
}

fn box_step_fn<F, R>(mut f: F) -> StepFn
where
    F: FnMut(Duration) -> R + 'static,
    R: StepResult,
{
    Box::new(move |step| f(step).into_step_result())
}

/// Runs a caller supplied update at a fixed rate, driven by variable frame
/// times.
///
/// Each advance call accumulates the (clamped, scaled) elapsed time, runs as
/// many fixed steps as fit (bounded by the substep cap), trims any leftover
/// backlog and returns the interpolation alpha `accumulator / step`.
pub struct FixedStepScheduler<C: Clock = SystemClock> {
    on_step: Option<StepFn>,
    on_error: Option<ErrorFn>,
    config: Config,
    clock: C,
    last_timepoint: Instant, // Clock reference for advance_with_clock
    accumulator: Duration, // Unconsumed simulation time
    paused: bool,

    // Telemetry for the most recent call
    last_raw_delta: Duration, // Pre-clamp, pre-scale
    last_steps: u32,
    step_error_caught: bool,
    last_step_error: Option<StepError>,

    #[cfg(feature = "metrics")]
    metrics: SchedulerMetrics,
}

impl FixedStepScheduler<SystemClock> {
    /// Creates a scheduler driven by the system monotonic clock.
    pub fn new<F, R>(step_fn: F, config: Config) -> Self
    where
        F: FnMut(Duration) -> R + 'static,
        R: StepResult,
    {
        Self::with_clock(step_fn, config, SystemClock)
    }
}

impl Default for FixedStepScheduler<SystemClock> {
    fn default() -> Self {
        Self::build(None, Config::default(), SystemClock)
    }
}

impl<C: Clock> FixedStepScheduler<C> {
    /// Creates a scheduler reading time from `clock`.
    pub fn with_clock<F, R>(step_fn: F, config: Config, clock: C) -> Self
    where
        F: FnMut(Duration) -> R + 'static,
        R: StepResult,
    {
        Self::build(Some(box_step_fn(step_fn)), config, clock)
    }

    fn build(on_step: Option<StepFn>, config: Config, clock: C) -> Self {
        let last_timepoint = clock.now();
        let mut scheduler = FixedStepScheduler {
            on_step,
            on_error: None,
            config: config.sanitized(),
            clock,
            last_timepoint,
            accumulator: Duration::ZERO,
            paused: false,
            last_raw_delta: Duration::ZERO,
            last_steps: 0,
            step_error_caught: false,
            last_step_error: None,
            #[cfg(feature = "metrics")]
            metrics: SchedulerMetrics::default(),
        };
        scheduler.reset(true);
        debug!("Created fixed step scheduler: {:?}", scheduler.config);
        scheduler
    }

    /// Clears the accumulator, telemetry and pause state.
    ///
    /// With `synchronize_now` the clock reference moves to the current time,
    /// so the next [`advance_with_clock`](Self::advance_with_clock) starts
    /// from a near-zero delta.
    pub fn reset(&mut self, synchronize_now: bool) {
        self.accumulator = Duration::ZERO;
        self.last_raw_delta = Duration::ZERO;
        self.last_steps = 0;
        self.step_error_caught = false;
        self.last_step_error = None;
        self.paused = false;
        if synchronize_now {
            self.last_timepoint = self.clock.now();
        }
        trace!("Scheduler reset (synchronize_now={})", synchronize_now);
    }

    /// Advances using the time elapsed on the clock since the previous
    /// observation. Returns the interpolation alpha.
    pub fn advance_with_clock(&mut self) -> f64 {
        let now = self.clock.now();
        // A clock that runs backwards counts as no time passing
        let raw = now.saturating_duration_since(self.last_timepoint);
        self.last_timepoint = now;
        self.advance(raw)
    }

    /// Advances by an externally measured elapsed time. The clock reference
    /// is left alone. Returns the interpolation alpha.
    pub fn advance_with_delta(&mut self, raw_elapsed: Duration) -> f64 {
        self.advance(raw_elapsed)
    }

    fn advance(&mut self, raw_elapsed: Duration) -> f64 {
        if self.paused {
            self.last_raw_delta = Duration::ZERO;
            self.last_steps = 0;
            #[cfg(feature = "metrics")]
            {
                self.metrics.paused_calls += 1;
            }
            return self.alpha();
        }
        self.step_error_caught = false;
        self.last_step_error = None;
        self.last_raw_delta = raw_elapsed;

        // Clamp [Safety]
        let mut dt = raw_elapsed.min(self.config.safety_max_delta);
        if dt < raw_elapsed {
            debug!("Clamped frame delta {:?} to {:?}", raw_elapsed, dt);
            #[cfg(feature = "metrics")]
            {
                self.metrics.clamped_time =
                    self.metrics.clamped_time.saturating_add(raw_elapsed - dt);
            }
        }

        if self.config.time_scale != 1.0 {
            dt = scale_duration(dt, self.config.time_scale);
        }

        self.accumulator = self.accumulator.saturating_add(dt);

        // Step loop [Safety cap]
        let step = self.config.step;
        let mut steps = 0;
        while self.accumulator >= step && steps < self.config.safety_max_substeps {
            if let Err(err) = self.invoke_step(step) {
                self.record_step_failure(err);
            }
            self.accumulator -= step;
            steps += 1;
        }
        self.last_steps = steps;

        #[cfg(feature = "metrics")]
        {
            self.metrics.advance_calls += 1;
            self.metrics.steps_executed += u64::from(steps);
            if self.accumulator >= step {
                self.metrics.substep_exhaustions += 1;
            }
        }

        // Trim backlog [Safety cap]
        let max_acc = self.max_accumulator();
        if self.accumulator > max_acc {
            debug!("Trimmed accumulator {:?} to {:?}", self.accumulator, max_acc);
            #[cfg(feature = "metrics")]
            {
                self.metrics.trimmed_time =
                    self.metrics.trimmed_time.saturating_add(self.accumulator - max_acc);
            }
            self.accumulator = max_acc;
        }

        let alpha = self.alpha();
        trace!(
            "Advanced: raw={:?}, dt={:?}, steps={}, accumulator={:?}, alpha={}",
            raw_elapsed, dt, steps, self.accumulator, alpha
        );
        alpha
    }

    // Runs the step callback once, turning panics into errors
    fn invoke_step(&mut self, step: Duration) -> Result<(), StepError> {
        let Some(on_step) = self.on_step.as_mut() else {
            return Ok(());
        };
        match panic::catch_unwind(AssertUnwindSafe(|| on_step(step))) {
            Ok(result) => result,
            Err(payload) => Err(StepError::from_panic(payload)),
        }
    }

    fn record_step_failure(&mut self, err: StepError) {
        if self.step_error_caught {
            debug!("Fixed step failed again: {}", err);
        } else {
            warn!("Fixed step failed: {}", err);
            self.last_step_error = Some(err);
        }
        self.step_error_caught = true;
        #[cfg(feature = "metrics")]
        {
            self.metrics.step_errors += 1;
        }

        if let Some(on_error) = self.on_error.as_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| on_error())).is_err() {
                warn!("Step error hook panicked");
            }
        }
    }

    fn max_accumulator(&self) -> Duration {
        self.config
            .step
            .checked_mul(self.config.safety_max_accumulator_overflow)
            .unwrap_or(Duration::MAX)
    }

    // Fraction of the next step already accumulated
    pub fn alpha(&self) -> f64 {
        self.accumulator.as_nanos() as f64 / self.config.step.as_nanos() as f64
    }

    pub fn step(&self) -> Duration {
        self.config.step
    }

    // Ignored when zero
    pub fn set_step(&mut self, step: Duration) {
        if step.is_zero() {
            debug!("Rejected zero step");
            return;
        }
        self.config.step = step;
    }

    // Updates per second
    pub fn rate(&self) -> f64 {
        rate_from_step(self.config.step)
    }

    pub fn set_rate(&mut self, hz: f64) {
        match step_from_rate(hz) {
            Some(step) => self.config.step = step,
            None => debug!("Rejected update rate {} Hz", hz),
        }
    }

    pub fn max_delta(&self) -> Duration {
        self.config.safety_max_delta
    }

    pub fn set_max_delta(&mut self, max_delta: Duration) {
        if max_delta.is_zero() {
            debug!("Rejected zero max delta");
            return;
        }
        self.config.safety_max_delta = max_delta;
    }

    pub fn max_substeps(&self) -> u32 {
        self.config.safety_max_substeps
    }

    pub fn set_max_substeps(&mut self, max_substeps: u32) {
        self.config.safety_max_substeps = max_substeps.max(1);
    }

    pub fn max_accumulator_overflow(&self) -> u32 {
        self.config.safety_max_accumulator_overflow
    }

    pub fn set_max_accumulator_overflow(&mut self, overflow: u32) {
        self.config.safety_max_accumulator_overflow = overflow.max(1);
    }

    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    // Negative and NaN scales clamp to 0.0, freezing time without pausing
    pub fn set_time_scale(&mut self, time_scale: f64) {
        self.config.time_scale = if time_scale >= 0.0 { time_scale } else { 0.0 };
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config.sanitized();
    }

    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn last_raw_delta(&self) -> Duration {
        self.last_raw_delta
    }

    pub fn last_steps_executed(&self) -> u32 {
        self.last_steps
    }

    pub fn step_error_caught(&self) -> bool {
        self.step_error_caught
    }

    // First step failure of the most recent call
    pub fn last_step_error(&self) -> Option<&StepError> {
        self.last_step_error.as_ref()
    }

    pub fn set_step_function<F, R>(&mut self, step_fn: F)
    where
        F: FnMut(Duration) -> R + 'static,
        R: StepResult,
    {
        self.on_step = Some(box_step_fn(step_fn));
    }

    pub fn clear_step_function(&mut self) {
        self.on_step = None;
    }

    pub fn has_step_function(&self) -> bool {
        self.on_step.is_some()
    }

    // Called once for every failing step
    pub fn set_error_function<F>(&mut self, error_fn: F)
    where
        F: FnMut() + 'static,
    {
        self.on_error = Some(Box::new(error_fn));
    }

    pub fn clear_error_function(&mut self) {
        self.on_error = None;
    }

    pub fn has_error_function(&self) -> bool {
        self.on_error.is_some()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }

    #[cfg(feature = "metrics")]
    pub fn reset_metrics(&mut self) {
        self.metrics = SchedulerMetrics::default();
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for FixedStepScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedStepScheduler")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("accumulator", &self.accumulator)
            .field("paused", &self.paused)
            .field("last_raw_delta", &self.last_raw_delta)
            .field("last_steps", &self.last_steps)
            .field("step_error_caught", &self.step_error_caught)
            .field("has_step_function", &self.on_step.is_some())
            .field("has_error_function", &self.on_error.is_some())
            .finish()
    }
}

// Multiplies by the time scale, truncating toward zero and saturating
pub(crate) fn scale_duration(dt: Duration, scale: f64) -> Duration {
    let nanos = (dt.as_nanos() as f64 * scale).trunc();
    if nanos >= u64::MAX as f64 {
        Duration::from_nanos(u64::MAX)
    } else {
        // NaN and negatives cast to zero
        Duration::from_nanos(nanos as u64)
    }
}

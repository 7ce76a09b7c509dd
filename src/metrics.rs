use std::time::Duration;

// Lifetime counters aggregated across advance calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerMetrics {
    pub advance_calls: u64,
    pub paused_calls: u64,
    pub steps_executed: u64,
    pub step_errors: u64,
    // Calls that hit the substep cap with at least one step still pending
    pub substep_exhaustions: u64,
    // Time dropped by the max delta clamp (before scaling)
    pub clamped_time: Duration,
    // Time dropped by the accumulator overflow trim
    pub trimmed_time: Duration,
}

impl SchedulerMetrics {
    /// Mean steps per non-paused advance call.
    pub fn average_steps(&self) -> f64 {
        if self.advance_calls == 0 {
            return 0.0;
        }
        self.steps_executed as f64 / self.advance_calls as f64
    }
}

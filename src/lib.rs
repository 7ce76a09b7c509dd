//! Fixed timestep scheduling for game and simulation loops.
//!
//! ```no_run
//! use std::time::Duration;
//! use fixstep::{Config, FixedStepScheduler};
//!
//! let mut scheduler = FixedStepScheduler::new(
//!     |dt: Duration| { /* fixed update */ },
//!     Config::default().with_max_substeps(4),
//! );
//! loop {
//!     let alpha = scheduler.advance_with_clock();
//!     // render(interpolate(previous, current, alpha));
//! #   let _ = alpha;
//! #   break;
//! }
//! ```
use log::{debug, info};

mod clock;
mod config;
mod error;
#[cfg(feature = "metrics")]
mod metrics;
mod timestep;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    Config, DEFAULT_MAX_ACCUMULATOR_OVERFLOW, DEFAULT_MAX_DELTA, DEFAULT_MAX_SUBSTEPS,
    DEFAULT_TIME_SCALE, STEP_120HZ, STEP_240HZ, STEP_60HZ,
};
pub use error::{ConfigError, StepError};
#[cfg(feature = "metrics")]
pub use metrics::SchedulerMetrics;
pub use timestep::{FixedStepScheduler, StepResult};

// Initializes logging for the library; RUST_LOG overrides the default filter
pub fn init() {
    match env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
    {
        Ok(()) => info!("fixstep initialized"),
        Err(err) => debug!("Logger already installed: {}", err),
    }
}

use std::any::Any;
use std::error::Error as StdError;
use thiserror::Error;

// Failure reported by a step callback. Always absorbed by the scheduler.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("step failed: {0}")]
    Failed(String),
    #[error("step panicked: {0}")]
    Panicked(String),
    #[error("step failed: {0}")]
    Source(Box<dyn StdError + Send + Sync>),
}

impl StepError {
    // Wraps any error type reported by user code
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        StepError::Source(Box::new(err))
    }

    // Builds an error from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        StepError::Panicked(message)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, StepError::Panicked(_))
    }
}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        StepError::Failed(message)
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        StepError::Failed(message.to_string())
    }
}

impl From<Box<dyn StdError + Send + Sync>> for StepError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        StepError::Source(err)
    }
}

// Invalid configuration values, reported by Config::validate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("step must be greater than zero")]
    InvalidStep,
    #[error("max delta must be greater than zero")]
    InvalidMaxDelta,
    #[error("invalid update rate: {0} Hz")]
    InvalidRate(f64),
    #[error("invalid time scale: {0}")]
    InvalidTimeScale(f64),
    #[error("max substeps must be at least 1")]
    InvalidMaxSubsteps,
    #[error("max accumulator overflow must be at least 1")]
    InvalidAccumulatorOverflow,
}

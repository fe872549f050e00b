// Run lifecycle domain model
use super::glucose::GlucoseUnit;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Snapshot of everything one auto run needs. Read-only once the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
    pub interval_seconds: f64,
    pub unit: GlucoseUnit,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_time < self.start_time {
            return Err(ConfigError::InvertedWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.max_value < self.min_value {
            return Err(ConfigError::InvertedRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        if !(self.step > 0.0) {
            return Err(ConfigError::NonPositiveStep(self.step));
        }
        if !(self.interval_seconds > 0.0) {
            return Err(ConfigError::NonPositiveInterval(self.interval_seconds));
        }
        let range = self.unit.legal_range();
        for value in [self.min_value, self.max_value] {
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    value,
                    unit: self.unit,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("end time {end} precedes start time {start}")]
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("max value {max} is below min value {min}")]
    InvertedRange { min: f64, max: f64 },
    #[error("step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("interval must be positive, got {0} seconds")]
    NonPositiveInterval(f64),
    #[error("{value} is outside the admissible range for {unit}")]
    OutOfRange { value: f64, unit: GlucoseUnit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Stopped,
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Stopped => write!(f, "stopped"),
            RunState::Completed => write!(f, "completed"),
        }
    }
}

/// Aggregate reported once per run, after Completed or Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub written: u64,
    pub failed: u64,
    pub state: RunState,
}

/// Result of a range delete. An empty range is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(u64),
    NothingToDelete,
}

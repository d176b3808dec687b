//! Per-invocation run context

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Timestamp and identifier of one conversion run.
///
/// Created once per invocation and passed to whatever needs the run id.
#[derive(Debug, Clone)]
pub struct RunContext {
    started_at: DateTime<Local>,
    started: Instant,
    run_id: String,
}

impl RunContext {
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Context for a run that started at a given wall-clock time
    pub fn starting_at(started_at: DateTime<Local>) -> Self {
        Self {
            run_id: started_at.format("%Y%m%d_%H%M%S").to_string(),
            started_at,
            started: Instant::now(),
        }
    }

    /// Run identifier, `YYYYmmdd_HHMMSS` of the start time
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log file used when logging to a file is requested without a path
    pub fn default_log_file(&self) -> PathBuf {
        PathBuf::from(format!("sheetgen_{}.log", self.run_id))
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

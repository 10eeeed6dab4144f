//! Run ledger: advisory per-job-name overlap locks and run records.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Exit status of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    Success,
    Failure(i32),
}

impl ExitStatus {
    /// Map a raw process exit code; zero is success.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Failure(code)
        }
    }

    /// Conventional process exit code.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Most recent run bookkeeping for one job name.
#[derive(Debug, Clone, Serialize)]
pub struct JobRunRecord {
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub running: bool,
    pub exit: Option<ExitStatus>,
}

#[derive(Debug, Default)]
struct RunSlot {
    active: u32,
    last_started: Option<DateTime<Utc>>,
    last_finished: Option<DateTime<Utc>>,
    last_exit: Option<ExitStatus>,
}

/// Tracks in-flight runs per job name.
///
/// This is the only concurrency control in the scheduler: an advisory
/// lock keyed by job name. The overlap check and the start mark happen
/// under a single map-entry guard, so two concurrent `try_start` calls
/// for the same overlap-protected name cannot both succeed.
#[derive(Debug, Default)]
pub struct RunLedger {
    slots: DashMap<String, RunSlot>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a run as started. Returns `false` when `exclusive` is set and
    /// a run of the same name is still in flight.
    pub fn try_start(&self, name: &str, exclusive: bool) -> bool {
        let mut slot = self.slots.entry(name.to_string()).or_default();
        if exclusive && slot.active > 0 {
            return false;
        }
        slot.active += 1;
        slot.last_started = Some(Utc::now());
        true
    }

    /// Mark a run as finished, releasing its overlap slot.
    pub fn finish(&self, name: &str, exit: ExitStatus) {
        if let Some(mut slot) = self.slots.get_mut(name) {
            slot.active = slot.active.saturating_sub(1);
            slot.last_finished = Some(Utc::now());
            slot.last_exit = Some(exit);
        }
    }

    /// Whether any run of `name` is currently in flight.
    pub fn is_running(&self, name: &str) -> bool {
        self.slots.get(name).map(|slot| slot.active > 0).unwrap_or(false)
    }

    /// Records for every job name the ledger has seen, sorted by name.
    pub fn snapshot(&self) -> Vec<JobRunRecord> {
        let mut records: Vec<JobRunRecord> = self
            .slots
            .iter()
            .map(|entry| {
                let slot = entry.value();
                JobRunRecord {
                    job_name: entry.key().clone(),
                    started_at: slot.last_started.unwrap_or_else(Utc::now),
                    finished_at: slot.last_finished,
                    running: slot.active > 0,
                    exit: slot.last_exit,
                }
            })
            .collect();
        records.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        records
    }
}

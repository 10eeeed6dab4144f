//! Job registry: the static job table and the run state around it.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::job::ScheduledJob;
use crate::ledger::{ExitStatus, JobRunRecord, RunLedger};

/// Registry of scheduled jobs.
///
/// Built once at process start from every registration site, then shared
/// immutably with the dispatcher. The run ledger is the only interior
/// mutability; the job table itself never changes after startup.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<ScheduledJob>,
    ledger: RunLedger,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job.
    ///
    /// Duplicate names follow last-registration-wins: the earlier
    /// definition is replaced in place (keeping its position) and the
    /// override is logged, since separate registration sites can drift
    /// apart without anyone noticing.
    pub fn register(&mut self, job: ScheduledJob) {
        if let Some(existing) = self.jobs.iter_mut().find(|j| j.name() == job.name()) {
            warn!(
                job = %job.name(),
                previous = %existing.trigger(),
                replacement = %job.trigger(),
                "duplicate job registration, last registration wins"
            );
            *existing = job;
        } else {
            debug!(job = %job.name(), trigger = %job.trigger(), "job registered");
            self.jobs.push(job);
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All jobs in registration order.
    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    pub fn get(&self, name: &str) -> Option<&ScheduledJob> {
        self.jobs.iter().find(|job| job.name() == name)
    }

    /// Jobs due in the minute containing `now`, in registration order.
    pub fn due_jobs(&self, now: DateTime<Utc>) -> impl Iterator<Item = &ScheduledJob> + '_ {
        self.jobs.iter().filter(move |job| job.is_due_at(now))
    }

    /// Mark a run of `job` as started.
    ///
    /// Returns `false` when the job is overlap-protected and a previous
    /// run is still in flight; the caller must then skip execution.
    pub fn try_start(&self, job: &ScheduledJob) -> bool {
        let started = self.ledger.try_start(job.name(), job.prevent_overlap());
        if started {
            debug!(job = %job.name(), "run started");
        }
        started
    }

    /// Record the end of a run: append the run block to the job's output
    /// sink, log the outcome, then release the overlap slot. A failed
    /// sink append is logged and swallowed.
    pub fn finish(&self, job: &ScheduledJob, exit: ExitStatus, output: &str) {
        let finished_at = Utc::now();
        if let Err(e) = job
            .output_sink()
            .append_run(job.name(), finished_at, exit, output)
        {
            warn!(
                job = %job.name(),
                sink = %job.output_sink().path().display(),
                "failed to append run output: {}",
                e
            );
        }

        if exit.is_success() {
            info!(job = %job.name(), "run finished");
        } else {
            error!(job = %job.name(), code = exit.code(), "run failed");
        }

        // Released last so the slot covers the bookkeeping above.
        self.ledger.finish(job.name(), exit);
    }

    /// Whether a run of `name` is currently in flight.
    pub fn is_running(&self, name: &str) -> bool {
        self.ledger.is_running(name)
    }

    /// Run records for every job the ledger has seen.
    pub fn run_records(&self) -> Vec<JobRunRecord> {
        self.ledger.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Trigger;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn job(name: &str, trigger: Trigger) -> ScheduledJob {
        ScheduledJob::new(name, trigger, "Africa/Dakar").unwrap()
    }

    #[test]
    fn registration_preserves_declaration_order() {
        let mut registry = JobRegistry::new();
        registry.register(job("backup:run", Trigger::daily_at("01:30").unwrap()));
        registry.register(job("devis:expire", Trigger::daily_at("02:00").unwrap()));

        let names: Vec<&str> = registry.jobs().iter().map(|j| j.name()).collect();
        assert_eq!(names, ["backup:run", "devis:expire"]);
    }

    #[test]
    fn duplicate_registration_replaces_in_place() {
        let mut registry = JobRegistry::new();
        registry.register(job("backup:run", Trigger::daily_at("01:30").unwrap()));
        registry.register(job("devis:expire", Trigger::daily_at("02:00").unwrap()));
        registry.register(job("backup:run", Trigger::daily_at("03:00").unwrap()));

        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.jobs().iter().map(|j| j.name()).collect();
        assert_eq!(names, ["backup:run", "devis:expire"]);
        assert_eq!(
            registry.get("backup:run").unwrap().cron_expression(),
            "0 0 3 * * *"
        );
    }

    #[test]
    fn due_jobs_filters_by_instant() {
        let mut registry = JobRegistry::new();
        registry.register(job("backup:run", Trigger::daily_at("01:30").unwrap()));
        registry.register(job("devis:expire", Trigger::daily_at("02:00").unwrap()));
        registry.register(job("queue:work", Trigger::EveryMinute));

        let at = Utc.with_ymd_and_hms(2026, 3, 2, 1, 30, 15).unwrap();
        let due: Vec<&str> = registry.due_jobs(at).map(|j| j.name()).collect();
        assert_eq!(due, ["backup:run", "queue:work"]);
    }

    #[test]
    fn try_start_respects_overlap_protection() {
        let mut registry = JobRegistry::new();
        registry.register(job("backup:run", Trigger::EveryMinute).with_prevent_overlap());
        let backup = registry.get("backup:run").unwrap().clone();

        assert!(registry.try_start(&backup));
        assert!(!registry.try_start(&backup));

        registry.finish(&backup, ExitStatus::Success, "");
        assert!(registry.try_start(&backup));
    }

    #[test]
    fn finish_appends_to_the_sink() {
        let dir = TempDir::new().unwrap();
        let mut registry = JobRegistry::new();
        registry.register(
            job("backup:run", Trigger::EveryMinute)
                .with_output_sink(dir.path().join("backup.log")),
        );
        let backup = registry.get("backup:run").unwrap().clone();

        registry.try_start(&backup);
        registry.finish(&backup, ExitStatus::Failure(2), "disk full");

        let content = std::fs::read_to_string(dir.path().join("backup.log")).unwrap();
        assert!(content.contains("backup:run exit=2"));
        assert!(content.contains("disk full"));
        assert!(!registry.is_running("backup:run"));
    }

    #[test]
    fn finish_survives_an_unwritable_sink() {
        let mut registry = JobRegistry::new();
        // Sink path sits under a file, so creating the parent fails.
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocked"), b"").unwrap();
        registry.register(
            job("backup:run", Trigger::EveryMinute)
                .with_output_sink(dir.path().join("blocked/backup.log")),
        );
        let backup = registry.get("backup:run").unwrap().clone();

        registry.try_start(&backup);
        registry.finish(&backup, ExitStatus::Success, "ok");

        // The run record is kept even though the append failed.
        assert!(!registry.is_running("backup:run"));
        let records = registry.run_records();
        assert_eq!(records[0].exit, Some(ExitStatus::Success));
    }
}

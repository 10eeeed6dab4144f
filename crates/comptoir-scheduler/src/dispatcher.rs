//! Minute-tick dispatcher: resolves due jobs and drives the executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SchedulerResult;
use crate::job::ScheduledJob;
use crate::ledger::ExitStatus;
use crate::registry::JobRegistry;

/// Captured result of one command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process-style exit code; zero is success.
    pub exit_code: i32,
    /// Combined captured stdout/stderr.
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: output.into(),
        }
    }
}

/// Executes job command bodies.
///
/// The job name is an opaque command identifier; resolving it into a
/// process or function call is entirely the executor's business.
/// Returning `Ok` with a non-zero `exit_code` means the command ran and
/// failed; `Err` means it could not be run at all. Either way the
/// dispatcher records the outcome and releases the overlap slot.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, job: &ScheduledJob) -> SchedulerResult<CommandOutput>;
}

/// Drives the registry once per minute.
///
/// The dispatcher never cancels an in-flight run. A hung run of an
/// overlap-protected job therefore blocks that job's future occurrences
/// until the process restarts; other jobs are unaffected.
pub struct Dispatcher {
    registry: Arc<JobRegistry>,
    executor: Arc<dyn CommandExecutor>,
    running: AtomicBool,
    last_minute: AtomicI64,
    dispatched: AtomicU64,
}

impl Dispatcher {
    pub fn new(registry: Arc<JobRegistry>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            registry,
            executor,
            running: AtomicBool::new(false),
            last_minute: AtomicI64::new(i64::MIN),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Whether the dispatch loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Total runs dispatched since construction.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Resolve and dispatch the jobs due at `now`, returning the number
    /// of runs started. Repeated calls within the same minute are no-ops,
    /// so a jittery timer cannot double-fire a minute.
    pub async fn tick(&self, now: DateTime<Utc>) -> usize {
        let minute = now.timestamp().div_euclid(60);
        if self.last_minute.swap(minute, Ordering::SeqCst) == minute {
            return 0;
        }

        let mut started = 0;
        for job in self.registry.due_jobs(now) {
            if !self.registry.try_start(job) {
                info!(
                    job = %job.name(),
                    "previous run still in flight, skipping this occurrence"
                );
                continue;
            }
            started += 1;
            self.dispatched.fetch_add(1, Ordering::Relaxed);
            self.spawn_run(job.clone());
        }
        if started > 0 {
            debug!(count = started, "tick dispatched jobs");
        }
        started
    }

    /// Run one job body on the runtime.
    ///
    /// The body runs in its own task so a panic is contained there and
    /// surfaces as a join error; `finish` is reached whether the executor
    /// succeeds, errors or panics, keeping the overlap slot from leaking.
    fn spawn_run(&self, job: ScheduledJob) {
        let registry = self.registry.clone();
        let executor = self.executor.clone();
        let run_id = Uuid::new_v4();
        tokio::spawn(async move {
            debug!(job = %job.name(), run = %run_id, "run dispatched");
            let body = {
                let job = job.clone();
                tokio::spawn(async move { executor.run(&job).await })
            };
            let (exit, output) = match body.await {
                Ok(Ok(out)) => (ExitStatus::from_code(out.exit_code), out.output),
                Ok(Err(e)) => (ExitStatus::Failure(1), e.to_string()),
                Err(join_error) => {
                    warn!(job = %job.name(), run = %run_id, "job body panicked");
                    (ExitStatus::Failure(1), format!("job body panicked: {}", join_error))
                }
            };
            registry.finish(&job, exit, &output);
        });
    }

    /// Tick at every minute boundary until `shutdown` is cancelled.
    ///
    /// In-flight runs are left to complete on the runtime; only the tick
    /// loop stops.
    pub async fn run_until(&self, shutdown: CancellationToken) {
        self.running.store(true, Ordering::SeqCst);
        info!(jobs = self.registry.len(), "dispatcher started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay_to_next_minute(Utc::now())) => {
                    self.tick(Utc::now()).await;
                }
            }
        }
        self.running.store(false, Ordering::SeqCst);
        info!("dispatcher stopped");
    }
}

/// Duration from `now` to just past the next minute boundary.
///
/// The 50ms margin keeps a tick from landing a hair before its minute;
/// the same-minute guard in [`Dispatcher::tick`] absorbs any double
/// fire after clock adjustments.
fn delay_to_next_minute(now: DateTime<Utc>) -> Duration {
    let elapsed_ms = u64::from(now.second()) * 1_000 + u64::from(now.timestamp_subsec_millis());
    Duration::from_millis(60_050u64.saturating_sub(elapsed_ms))
}

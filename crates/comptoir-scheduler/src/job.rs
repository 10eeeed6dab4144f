//! Scheduled job definition and due-time matching.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::{SchedulerError, SchedulerResult};
use crate::sink::OutputSink;
use crate::trigger::Trigger;

/// Default directory for per-job output sinks.
const DEFAULT_SINK_DIR: &str = "logs/jobs";

/// A recurring job declared at process start.
///
/// Jobs are immutable after registration: the registry is built once and
/// then shared with the dispatcher for the lifetime of the process. The
/// `name` is an opaque command identifier handed verbatim to the
/// executor; it may carry literal flags, e.g. `"queue:work
/// --stop-when-empty"`.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    name: String,
    trigger: Trigger,
    timezone: Tz,
    prevent_overlap: bool,
    output_sink: OutputSink,
    schedule: Schedule,
}

impl ScheduledJob {
    /// Create a job running in the given IANA timezone.
    ///
    /// # Errors
    ///
    /// Fails when the timezone is unknown or the trigger does not
    /// compile. Both are configuration mistakes and surface at
    /// registration time, never at trigger evaluation.
    pub fn new(
        name: impl Into<String>,
        trigger: Trigger,
        timezone: &str,
    ) -> SchedulerResult<Self> {
        let name = name.into();
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| SchedulerError::UnknownTimezone(timezone.to_string()))?;
        let schedule = trigger.compile()?;
        let output_sink = OutputSink::new(default_sink_path(&name));
        Ok(Self {
            name,
            trigger,
            timezone,
            prevent_overlap: false,
            output_sink,
            schedule,
        })
    }

    /// Forbid a new run while a previous run of this job is in flight.
    pub fn with_prevent_overlap(mut self) -> Self {
        self.prevent_overlap = true;
        self
    }

    /// Send run output to the given append-only file instead of the
    /// default `logs/jobs/<name>.log`.
    pub fn with_output_sink(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_sink = OutputSink::new(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn prevent_overlap(&self) -> bool {
        self.prevent_overlap
    }

    pub fn output_sink(&self) -> &OutputSink {
        &self.output_sink
    }

    pub fn cron_expression(&self) -> String {
        self.trigger.cron_expression()
    }

    /// Whether this job is due in the minute containing `now`.
    ///
    /// The instant is converted to the job's own timezone and truncated
    /// to the minute before matching, so seconds never influence the
    /// result and every UTC instant inside a due minute matches.
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        // Truncation can fail around DST transitions; a skipped minute
        // there matches ordinary cron behavior for nonexistent times.
        let minute = match local.with_second(0).and_then(|t| t.with_nanosecond(0)) {
            Some(minute) => minute,
            None => return false,
        };
        self.schedule.includes(minute)
    }

    /// Next instant strictly after `now` at which this job fires.
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = now.with_timezone(&self.timezone);
        self.schedule.after(&local).next().map(|dt| dt.with_timezone(&Utc))
    }
}

fn default_sink_path(name: &str) -> PathBuf {
    Path::new(DEFAULT_SINK_DIR).join(format!("{}.log", sanitize_name(name)))
}

/// Filesystem-safe rendering of a job identifier.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

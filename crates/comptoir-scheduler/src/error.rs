//! Error types for the scheduler.

use thiserror::Error;

/// Errors that can occur while building or running scheduled jobs.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Timezone string is not a known IANA zone.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Time-of-day string did not parse.
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    /// Weekday string did not parse.
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    /// Cron expression did not compile.
    #[error("Invalid cron expression '{expr}': {message}")]
    InvalidCron { expr: String, message: String },

    /// The executor could not run the command at all.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that can occur while loading scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Referenced environment variable is not set.
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// A declared job failed validation.
    #[error("Invalid job '{job}': {source}")]
    JobSpec {
        job: String,
        #[source]
        source: SchedulerError,
    },

    /// Scheduler error outside any particular job entry.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

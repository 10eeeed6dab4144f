//! Scheduler configuration: the declarative job table.
//!
//! The configuration file is one of the registration sites feeding the
//! [`JobRegistry`](crate::registry::JobRegistry); entries here may
//! override built-in jobs by name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SchedulerResult};
use crate::job::{ScheduledJob, sanitize_name};
use crate::trigger::Trigger;

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string, expanding `${VAR}` references.
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Validate every declared job, returning them in declaration order.
    ///
    /// Any invalid entry is fatal: the scheduler must refuse to start on
    /// a partially valid job table rather than silently drop entries.
    pub fn build_jobs(&self) -> Result<Vec<ScheduledJob>, ConfigError> {
        self.scheduler
            .jobs
            .iter()
            .map(|spec| spec.build(&self.scheduler))
            .collect()
    }
}

/// The `[scheduler]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Default IANA zone for jobs that do not set their own.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Directory receiving default per-job output sinks.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Declarative job table.
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

fn default_timezone() -> String {
    "Africa/Dakar".to_string()
}

fn default_log_dir() -> String {
    "logs/jobs".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            log_dir: default_log_dir(),
            jobs: Vec::new(),
        }
    }
}

/// The `[executor]` section: how job identifiers become processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Program receiving the job identifier, split on whitespace, as its
    /// arguments.
    #[serde(default = "default_runner")]
    pub runner: String,

    /// Working directory for spawned runs.
    #[serde(default)]
    pub work_dir: Option<String>,
}

fn default_runner() -> String {
    "bin/comptoir-task".to_string()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            runner: default_runner(),
            work_dir: None,
        }
    }
}

/// One declarative job entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Command identifier; may bake in literal flags.
    pub name: String,

    /// When the job runs.
    pub trigger: TriggerSpec,

    /// IANA zone override for this job.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Forbid a new run while the previous one is in flight.
    #[serde(default)]
    pub prevent_overlap: bool,

    /// Output sink path override.
    #[serde(default)]
    pub output: Option<String>,
}

impl JobSpec {
    /// Validate the entry into a registrable job.
    pub fn build(&self, defaults: &SchedulerConfig) -> Result<ScheduledJob, ConfigError> {
        self.build_inner(defaults).map_err(|source| ConfigError::JobSpec {
            job: self.name.clone(),
            source,
        })
    }

    fn build_inner(&self, defaults: &SchedulerConfig) -> SchedulerResult<ScheduledJob> {
        let trigger = self.trigger.to_trigger()?;
        let timezone = self.timezone.as_deref().unwrap_or(&defaults.timezone);
        let mut job = ScheduledJob::new(&self.name, trigger, timezone)?;
        if self.prevent_overlap {
            job = job.with_prevent_overlap();
        }
        let sink = match &self.output {
            Some(path) => PathBuf::from(expand_path(path)),
            None => PathBuf::from(expand_path(&defaults.log_dir))
                .join(format!("{}.log", sanitize_name(&self.name))),
        };
        Ok(job.with_output_sink(sink))
    }
}

/// Serde-facing trigger spelling.
///
/// ```toml
/// trigger = { daily_at = "01:30" }
/// trigger = { weekly_on = { day = "mon", at = "08:00" } }
/// trigger = "every_minute"
/// trigger = { cron = "0 30 1 * * *" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSpec {
    DailyAt(String),
    WeeklyOn { day: String, at: String },
    EveryMinute,
    Cron(String),
}

impl TriggerSpec {
    fn to_trigger(&self) -> SchedulerResult<Trigger> {
        match self {
            TriggerSpec::DailyAt(at) => Trigger::daily_at(at),
            TriggerSpec::WeeklyOn { day, at } => Trigger::weekly_on(day, at),
            TriggerSpec::EveryMinute => Ok(Trigger::EveryMinute),
            TriggerSpec::Cron(expr) => Trigger::cron(expr),
        }
    }
}

/// Expand environment variables in the format `${VAR}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
        result = result.replace(&cap[0], &var_value);
    }

    Ok(result)
}

/// Expand shell-style paths (e.g., `~/logs`).
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_empty_config() {
        let config = Config::load_str("").unwrap();
        assert_eq!(config.scheduler.timezone, "Africa/Dakar");
        assert_eq!(config.scheduler.log_dir, "logs/jobs");
        assert!(config.scheduler.jobs.is_empty());
        assert_eq!(config.executor.runner, "bin/comptoir-task");
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [scheduler]
            timezone = "Europe/Paris"
            log_dir = "/var/log/comptoir/jobs"

            [executor]
            runner = "/opt/comptoir/bin/comptoir-task"
            work_dir = "/opt/comptoir"

            [[scheduler.jobs]]
            name = "backup:run"
            trigger = { daily_at = "01:30" }
            prevent_overlap = true

            [[scheduler.jobs]]
            name = "factures:overdue-remind"
            trigger = { weekly_on = { day = "mon", at = "08:00" } }

            [[scheduler.jobs]]
            name = "queue:work --stop-when-empty"
            trigger = "every_minute"
            prevent_overlap = true

            [[scheduler.jobs]]
            name = "rapport:mensuel"
            trigger = { cron = "0 0 6 1 * *" }
            timezone = "Europe/Paris"
            output = "/var/log/comptoir/rapport.log"
        "#;

        let config = Config::load_str(content).unwrap();
        assert_eq!(config.scheduler.timezone, "Europe/Paris");
        assert_eq!(config.scheduler.jobs.len(), 4);
        assert_eq!(config.executor.work_dir.as_deref(), Some("/opt/comptoir"));

        let jobs = config.build_jobs().unwrap();
        assert_eq!(jobs[0].cron_expression(), "0 30 1 * * *");
        assert!(jobs[0].prevent_overlap());
        assert_eq!(jobs[1].cron_expression(), "0 0 8 * * MON");
        assert!(!jobs[1].prevent_overlap());
        assert_eq!(jobs[2].name(), "queue:work --stop-when-empty");
        assert_eq!(jobs[3].cron_expression(), "0 0 6 1 * *");
        assert_eq!(
            jobs[3].output_sink().path(),
            Path::new("/var/log/comptoir/rapport.log")
        );
    }

    #[test]
    fn test_default_sink_lives_under_log_dir() {
        let content = r#"
            [scheduler]
            log_dir = "custom/logs"

            [[scheduler.jobs]]
            name = "devis:expire"
            trigger = { daily_at = "02:00" }
        "#;

        let jobs = Config::load_str(content).unwrap().build_jobs().unwrap();
        assert_eq!(
            jobs[0].output_sink().path(),
            Path::new("custom/logs/devis-expire.log")
        );
    }

    #[test]
    fn test_job_timezone_falls_back_to_scheduler_default() {
        let content = r#"
            [scheduler]
            timezone = "Asia/Tokyo"

            [[scheduler.jobs]]
            name = "devis:expire"
            trigger = { daily_at = "02:00" }
        "#;

        let jobs = Config::load_str(content).unwrap().build_jobs().unwrap();
        assert_eq!(jobs[0].timezone().to_string(), "Asia/Tokyo");
    }

    #[test]
    fn test_invalid_timezone_is_fatal_and_names_the_job() {
        let content = r#"
            [[scheduler.jobs]]
            name = "devis:expire"
            trigger = { daily_at = "02:00" }
            timezone = "Mars/Olympus"
        "#;

        let err = Config::load_str(content).unwrap().build_jobs().unwrap_err();
        assert!(err.to_string().contains("devis:expire"));
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_invalid_time_is_fatal() {
        let content = r#"
            [[scheduler.jobs]]
            name = "backup:run"
            trigger = { daily_at = "25:99" }
        "#;

        let err = Config::load_str(content).unwrap().build_jobs().unwrap_err();
        assert!(matches!(err, ConfigError::JobSpec { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let content = "invalid = [unclosed";
        let result = Config::load_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("COMPTOIR_TEST_LOG_DIR", "/tmp/comptoir-logs");
        }
        let content = r#"
            [scheduler]
            log_dir = "${COMPTOIR_TEST_LOG_DIR}"
        "#;
        let config = Config::load_str(content).unwrap();
        assert_eq!(config.scheduler.log_dir, "/tmp/comptoir-logs");
        unsafe {
            std::env::remove_var("COMPTOIR_TEST_LOG_DIR");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = r#"log_dir = "${NONEXISTENT_COMPTOIR_VAR_12345}""#;
        let result = Config::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = expand_path("~/logs");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/logs"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(expand_path("/var/log/comptoir"), "/var/log/comptoir");
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]").unwrap();
        writeln!(file, "timezone = \"Europe/Paris\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scheduler.timezone, "Europe/Paris");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load(Path::new("/nonexistent/path/comptoir.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

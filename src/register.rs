//! Job registration for Comptoir.
//!
//! Two registration sites feed the registry, in order: the built-in
//! catalog below, then the configuration file. The registry applies
//! last-registration-wins for duplicate names and logs every override,
//! so a config entry can move a built-in job without the two sites
//! silently disagreeing.

use tracing::info;

use comptoir_scheduler::config::expand_path;
use comptoir_scheduler::{Config, ConfigError, JobRegistry, ScheduledJob, SchedulerConfig, Trigger};

/// Built-in job catalog.
pub(crate) fn builtin_jobs(defaults: &SchedulerConfig) -> Result<Vec<ScheduledJob>, ConfigError> {
    let zone = defaults.timezone.as_str();
    let log_dir = std::path::PathBuf::from(expand_path(&defaults.log_dir));

    let jobs = vec![
        // Nightly database backup; a slow backup must never pile up.
        ScheduledJob::new("backup:run", Trigger::daily_at("01:30")?, zone)?
            .with_prevent_overlap()
            .with_output_sink(log_dir.join("backup.log")),
        // Flag quotes past their validity date.
        ScheduledJob::new("devis:expire", Trigger::daily_at("02:00")?, zone)?
            .with_output_sink(log_dir.join("devis-expire.log")),
        // Monday-morning reminders for overdue invoices.
        ScheduledJob::new("factures:overdue-remind", Trigger::weekly_on("mon", "08:00")?, zone)?
            .with_output_sink(log_dir.join("overdue-remind.log")),
        // Drain the work queue; one drainer at a time.
        ScheduledJob::new("queue:work --stop-when-empty", Trigger::EveryMinute, zone)?
            .with_prevent_overlap()
            .with_output_sink(log_dir.join("queue-work.log")),
    ];
    Ok(jobs)
}

/// Build the registry from every registration site.
pub(crate) fn build_registry(config: &Config) -> Result<JobRegistry, ConfigError> {
    let mut registry = JobRegistry::new();

    for job in builtin_jobs(&config.scheduler)? {
        registry.register(job);
    }
    for job in config.build_jobs()? {
        registry.register(job);
    }

    info!(jobs = registry.len(), "job registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_registers_four_jobs() {
        let registry = build_registry(&Config::default()).unwrap();
        assert_eq!(registry.len(), 4);

        let names: Vec<&str> = registry.jobs().iter().map(|j| j.name()).collect();
        assert_eq!(
            names,
            [
                "backup:run",
                "devis:expire",
                "factures:overdue-remind",
                "queue:work --stop-when-empty",
            ]
        );
    }

    #[test]
    fn builtin_catalog_uses_the_default_timezone() {
        let registry = build_registry(&Config::default()).unwrap();
        for job in registry.jobs() {
            assert_eq!(job.timezone().to_string(), "Africa/Dakar");
        }
    }

    #[test]
    fn overlap_protection_matches_the_catalog() {
        let registry = build_registry(&Config::default()).unwrap();
        assert!(registry.get("backup:run").unwrap().prevent_overlap());
        assert!(!registry.get("devis:expire").unwrap().prevent_overlap());
        assert!(registry.get("queue:work --stop-when-empty").unwrap().prevent_overlap());
    }

    #[test]
    fn config_entry_overrides_a_builtin_by_name() {
        let config = Config::load_str(
            r#"
            [[scheduler.jobs]]
            name = "backup:run"
            trigger = { daily_at = "03:00" }
            prevent_overlap = true
        "#,
        )
        .unwrap();

        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.get("backup:run").unwrap().cron_expression(),
            "0 0 3 * * *"
        );
    }

    #[test]
    fn config_entries_extend_the_catalog() {
        let config = Config::load_str(
            r#"
            [[scheduler.jobs]]
            name = "caisse:close"
            trigger = { daily_at = "21:00" }
        "#,
        )
        .unwrap();

        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("caisse:close").is_some());
    }

    #[test]
    fn invalid_config_job_fails_registration() {
        let config = Config::load_str(
            r#"
            [[scheduler.jobs]]
            name = "caisse:close"
            trigger = { daily_at = "21:00" }
            timezone = "Mars/Olympus"
        "#,
        )
        .unwrap();

        let err = build_registry(&config).unwrap_err();
        assert!(err.to_string().contains("caisse:close"));
    }
}

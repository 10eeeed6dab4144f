//! Adapter types and utility functions for Comptoir.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use comptoir_scheduler::config::expand_path;
use comptoir_scheduler::{
    CommandExecutor, CommandOutput, ExecutorConfig, ScheduledJob, SchedulerError,
    SchedulerResult,
};

/// Get the .comptoir directory path.
pub(crate) fn comptoir_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".comptoir"))
        .unwrap_or_else(|| PathBuf::from(".comptoir"))
}

/// Subprocess executor: hands the job identifier to the configured
/// runner program.
///
/// The identifier is split on whitespace, so flags baked into a job
/// name (`"queue:work --stop-when-empty"`) arrive as separate
/// arguments. Runs are never timed out; a command that does not exit
/// holds its overlap slot until the process restarts.
pub(crate) struct ProcessExecutor {
    runner: PathBuf,
    work_dir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub(crate) fn new(config: &ExecutorConfig) -> Self {
        Self {
            runner: PathBuf::from(expand_path(&config.runner)),
            work_dir: config.work_dir.as_deref().map(|d| PathBuf::from(expand_path(d))),
        }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, job: &ScheduledJob) -> SchedulerResult<CommandOutput> {
        let mut cmd = Command::new(&self.runner);
        cmd.args(job.name().split_whitespace())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| {
            SchedulerError::ExecutionFailed(format!(
                "failed to spawn {}: {}",
                self.runner.display(),
                e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut combined = String::new();
        if !stdout.is_empty() {
            combined.push_str(&stdout);
        }
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push_str("\n--- stderr ---\n");
            }
            combined.push_str(&stderr);
        }

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}

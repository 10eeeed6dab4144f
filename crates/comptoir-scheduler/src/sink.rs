//! Append-only job output sinks.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::ledger::ExitStatus;

/// Append-only destination for captured job output.
///
/// Appends are best-effort and non-transactional: callers log a failed
/// append and carry on, a run is never failed because its output could
/// not be written.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one run block: a header line with the finish timestamp, job
    /// name and exit code, then the captured output.
    pub fn append_run(
        &self,
        job_name: &str,
        finished_at: DateTime<Utc>,
        exit: ExitStatus,
        output: &str,
    ) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut block = format!(
            "[{}] {} exit={}\n",
            finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
            job_name,
            exit.code()
        );
        if !output.is_empty() {
            block.push_str(output);
            if !output.ends_with('\n') {
                block.push('\n');
            }
        }
        block.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(block.as_bytes())
    }
}

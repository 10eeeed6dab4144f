//! # Comptoir Scheduler
//!
//! Recurring-job registry and minute-tick dispatcher for the Comptoir
//! business-management backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Registration sites                      │
//! │   built-in catalog  +  config/comptoir.toml job table       │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │ register() at process start
//! ┌───────────────────────────▼─────────────────────────────────┐
//! │                        JobRegistry                          │
//! │   immutable job table  +  RunLedger (overlap locks)         │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │ due_jobs(now) / try_start / finish
//! ┌───────────────────────────▼─────────────────────────────────┐
//! │                        Dispatcher                           │
//! │   minute tick  →  spawn run  →  CommandExecutor             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`ScheduledJob`]: A named command with a [`Trigger`], its own IANA
//!   timezone and an append-only [`OutputSink`]
//! - [`JobRegistry`]: The static job table plus the advisory run ledger
//! - [`Dispatcher`]: Ticks once per minute and hands due jobs to a
//!   [`CommandExecutor`]
//! - [`Config`]: The declarative TOML job table
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use comptoir_scheduler::{
//!     CancellationToken, CommandExecutor, CommandOutput, Dispatcher, JobRegistry,
//!     ScheduledJob, SchedulerResult, Trigger,
//! };
//!
//! struct NoopExecutor;
//!
//! #[async_trait::async_trait]
//! impl CommandExecutor for NoopExecutor {
//!     async fn run(&self, _job: &ScheduledJob) -> SchedulerResult<CommandOutput> {
//!         Ok(CommandOutput::success(""))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> SchedulerResult<()> {
//!     let mut registry = JobRegistry::new();
//!     registry.register(
//!         ScheduledJob::new("backup:run", Trigger::daily_at("01:30")?, "Africa/Dakar")?
//!             .with_prevent_overlap(),
//!     );
//!
//!     let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(NoopExecutor));
//!     dispatcher.run_until(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod ledger;
pub mod registry;
pub mod sink;
pub mod trigger;

// Re-exports
pub use config::{Config, ExecutorConfig, JobSpec, SchedulerConfig, TriggerSpec};
pub use dispatcher::{CommandExecutor, CommandOutput, Dispatcher};
pub use error::{ConfigError, SchedulerError, SchedulerResult};
pub use job::ScheduledJob;
pub use ledger::{ExitStatus, JobRunRecord, RunLedger};
pub use registry::JobRegistry;
pub use sink::OutputSink;
pub use trigger::Trigger;

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;

//! slurm_convert
//!
//! Renders a SLURM batch script that converts a distributed (tensor-parallel)
//! training checkpoint into a single `.nemo` file, submits it with `sbatch`, and
//! hands back the job id so later pipeline stages can depend on it.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Typed view of the conversion configuration
//! - **config**: Loading, overrides and `${...}` interpolation
//! - **system**: Filesystem helpers and shell-style globbing
//! - **slurm**: Batch script rendering and `sbatch` submission
//! - **orchestrator**: The end-to-end submission pass
//! - **log_collector**: Backend for the `log` facade

// Core foundational modules
pub mod error;
pub mod models;

pub mod config;
pub mod log_collector;
pub mod orchestrator;
pub mod slurm;
pub mod system;

// Re-export the log crate for macro usage
pub use log;

pub use config::ConfigTree;
pub use error::{ConfigError, Result, SubmitError};
pub use log_collector::LogCollector;
pub use models::{ConversionJob, ModelSpec, RunSpec, SlurmSpec};
pub use orchestrator::{prepare_batch_script, run_conversion};
pub use slurm::{BatchSubmitter, SbatchSubmitter, SlurmOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
